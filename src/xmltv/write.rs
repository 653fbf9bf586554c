use crate::xmltv::dom::{write_document, DomError, Element};
use std::fs::File;
use std::io::Write;
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum WriteError {
    #[error("Failed to write output file: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Serialize(#[from] DomError),
}

/// Writes the merged guide to disk.
///
/// Serializes `doc` once and writes the same bytes to `xml_path` and,
/// when `also_gzip` is set, through a gzip encoder to `xml_path + ".gz"`,
/// so decompressing the `.gz` file always yields the plain file exactly.
/// The parent directory is created first if missing. Existing files are
/// overwritten in place.
pub fn write_outputs(doc: &Element, xml_path: &Path, also_gzip: bool) -> Result<(), WriteError> {
    if let Some(parent) = xml_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let bytes = write_document(doc)?;
    std::fs::write(xml_path, &bytes)?;
    tracing::info!(path = %xml_path.display(), bytes = bytes.len(), "Wrote EPG");

    if also_gzip {
        let gz_path = gz_path_for(xml_path);
        let file = File::create(&gz_path)?;
        let mut encoder = flate2::write::GzEncoder::new(file, flate2::Compression::default());
        encoder.write_all(&bytes)?;
        encoder.finish()?;
        tracing::info!(path = %gz_path.display(), "Wrote compressed EPG");
    }

    Ok(())
}

/// Returns the `.gz` sibling path: the plain path with `.gz` appended
/// (`guide.xml` becomes `guide.xml.gz`, not `guide.gz`).
pub fn gz_path_for(xml_path: &Path) -> std::path::PathBuf {
    let mut os = xml_path.as_os_str().to_owned();
    os.push(".gz");
    std::path::PathBuf::from(os)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::xmltv::dom::{parse_document, Node};
    use std::io::Read;
    use std::path::PathBuf;

    fn scratch_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("epg_sift_write_test_{}", name));
        std::fs::remove_dir_all(&dir).ok();
        dir
    }

    fn sample_doc() -> Element {
        let mut root = Element::new("tv");
        let mut channel = Element::new("channel");
        channel.attrs.push(("id".to_string(), "a.us".to_string()));
        root.children.push(Node::Element(channel));
        root
    }

    #[test]
    fn test_writes_xml_with_declaration() {
        let dir = scratch_dir("plain");
        let path = dir.join("guide.xml");

        write_outputs(&sample_doc(), &path, false).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.starts_with("<?xml version=\"1.0\" encoding=\"utf-8\"?>"));
        assert!(content.contains("<channel id=\"a.us\"/>"));
        assert!(!gz_path_for(&path).exists());

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_creates_missing_parent_directory() {
        let dir = scratch_dir("mkdir").join("nested").join("epgs");
        let path = dir.join("guide.xml");

        write_outputs(&sample_doc(), &path, false).unwrap();
        assert!(path.exists());

        std::fs::remove_dir_all(dir.parent().unwrap().parent().unwrap()).ok();
    }

    #[test]
    fn test_gzip_output_matches_plain_output() {
        let dir = scratch_dir("gzip");
        let path = dir.join("guide.xml");

        write_outputs(&sample_doc(), &path, true).unwrap();

        let plain = std::fs::read(&path).unwrap();
        let gz = std::fs::read(gz_path_for(&path)).unwrap();
        let mut decompressed = Vec::new();
        flate2::read::GzDecoder::new(gz.as_slice())
            .read_to_end(&mut decompressed)
            .unwrap();
        assert_eq!(plain, decompressed);

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_overwrites_existing_output() {
        let dir = scratch_dir("overwrite");
        let path = dir.join("guide.xml");
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(&path, "stale content").unwrap();

        write_outputs(&sample_doc(), &path, false).unwrap();

        let reparsed = parse_document(&std::fs::read(&path).unwrap()).unwrap();
        assert_eq!(reparsed.name, "tv");

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_gz_path_appends_extension() {
        assert_eq!(
            gz_path_for(Path::new("/out/guide.xml")),
            Path::new("/out/guide.xml.gz")
        );
    }
}
