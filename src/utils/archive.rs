//! TAR/gzip source detection and JSON member selection for the Extract
//! phase. A Skype export source is either a bare JSON file or a tarball
//! (optionally gzipped) containing one or more `.json` entries.

use std::io::Read;
use std::path::Path;

use flate2::read::GzDecoder;

const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKind {
    Json,
    Tar,
    TarGz,
}

/// Sniffs the source kind from its leading bytes rather than its extension,
/// so a renamed or extensionless export is still handled correctly.
pub fn detect_source_kind(bytes: &[u8]) -> SourceKind {
    if bytes.len() >= 2 && bytes[..2] == GZIP_MAGIC {
        return SourceKind::TarGz;
    }
    // POSIX tar: "ustar" magic at offset 257, or a plausible octal header
    // when truncated/non-standard. Fall back to JSON otherwise.
    if bytes.len() > 262 && &bytes[257..262] == b"ustar" {
        return SourceKind::Tar;
    }
    SourceKind::Json
}

pub struct ArchiveMember {
    pub name: String,
    pub contents: Vec<u8>,
}

/// Lists every `.json` entry in a tar (or tar.gz) archive, in archive order.
pub fn list_json_members(bytes: &[u8], kind: SourceKind) -> std::io::Result<Vec<ArchiveMember>> {
    let mut members = Vec::new();
    let reader: Box<dyn Read> = match kind {
        SourceKind::TarGz => Box::new(GzDecoder::new(bytes)),
        SourceKind::Tar => Box::new(bytes),
        SourceKind::Json => return Ok(members),
    };

    let mut archive = tar::Archive::new(reader);
    for entry in archive.entries()? {
        let mut entry = entry?;
        let path = entry.path()?.to_string_lossy().to_string();
        if !path.ends_with(".json") {
            continue;
        }
        let mut contents = Vec::new();
        entry.read_to_end(&mut contents)?;
        members.push(ArchiveMember { name: path, contents });
    }
    Ok(members)
}

/// Selects which archive member to treat as the `RawExport` document:
/// explicit name, else explicit index, else the first qualifying entry.
pub fn select_member<'a>(
    members: &'a [ArchiveMember],
    name: Option<&str>,
    index: Option<usize>,
) -> Option<&'a ArchiveMember> {
    if let Some(name) = name {
        return members.iter().find(|m| m.name == name || m.name.ends_with(name));
    }
    if let Some(index) = index {
        return members.get(index);
    }
    members.first()
}

pub fn read_source(path: &Path) -> std::io::Result<Vec<u8>> {
    std::fs::read(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detects_json_by_default() {
        assert_eq!(detect_source_kind(b"{\"userId\": \"x\"}"), SourceKind::Json);
    }

    #[test]
    fn detects_gzip_magic() {
        assert_eq!(detect_source_kind(&[0x1f, 0x8b, 0x08]), SourceKind::TarGz);
    }

    #[test]
    fn select_member_prefers_explicit_name() {
        let members = vec![
            ArchiveMember { name: "a.json".into(), contents: vec![1] },
            ArchiveMember { name: "messages.json".into(), contents: vec![2] },
        ];
        let selected = select_member(&members, Some("messages.json"), None).unwrap();
        assert_eq!(selected.contents, vec![2]);
    }

    #[test]
    fn select_member_falls_back_to_first() {
        let members = vec![ArchiveMember { name: "a.json".into(), contents: vec![1] }];
        let selected = select_member(&members, None, None).unwrap();
        assert_eq!(selected.name, "a.json");
    }
}
