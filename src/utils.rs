use std::{
    io,
    path::{Path, PathBuf},
    rc::Rc,
};

pub const SOURCE_EXTENSION: &str = "mc";
pub const ASSEMBLY_EXTENSION: &str = "j";

pub fn file_to_chars<P: AsRef<Path>>(path: P) -> io::Result<Rc<Vec<char>>> {
    let data = std::fs::read_to_string(path)?;
    Ok(Rc::new(data.chars().collect()))
}

/// Name of the generated class: the file name without its `.mc` extension
pub fn class_name<P: AsRef<Path>>(path: P) -> String {
    let path = path.as_ref();
    let name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();
    match name.strip_suffix(&format!(".{SOURCE_EXTENSION}")) {
        Some(stem) => stem.to_string(),
        None => name,
    }
}

/// `<class>.j` in the current directory
pub fn assembly_path<P: AsRef<Path>>(source: P) -> PathBuf {
    PathBuf::from(format!("{}.{ASSEMBLY_EXTENSION}", class_name(source)))
}
