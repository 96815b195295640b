//! A minimal BagIt writer for metadata-only bags.
//!
//! Deposits never carry payload: `data/` is empty and so is every payload
//! manifest. What remains is the tag side of the bag, `bagit.txt`,
//! `bag-info.txt` and whatever the caller puts under `metadata/`, all
//! listed in one tag manifest per checksum algorithm.

use crate::error::{ErrorKind, Result};
use exn::ResultExt;
use sha2::{Digest, Sha256, Sha512};
use std::fmt::Write as _;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use time::OffsetDateTime;
use time::macros::format_description;

const BAGIT_TXT: &str = "BagIt-Version: 1.0\nTag-File-Character-Encoding: UTF-8\n";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChecksumAlgorithm {
    Sha256,
    Sha512,
}
impl ChecksumAlgorithm {
    /// Lowercase name, as used in manifest filenames.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Sha256 => "sha256",
            Self::Sha512 => "sha512",
        }
    }

    pub fn digest(&self, data: &[u8]) -> String {
        match self {
            Self::Sha256 => hex::encode(Sha256::digest(data)),
            Self::Sha512 => hex::encode(Sha512::digest(data)),
        }
    }
}
impl FromStr for ChecksumAlgorithm {
    type Err = crate::error::Error;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('-', "").as_str() {
            "sha256" => Ok(Self::Sha256),
            "sha512" => Ok(Self::Sha512),
            _ => exn::bail!(ErrorKind::UnsupportedAlgorithm(s.to_string())),
        }
    }
}

pub struct Bag {
    dir: PathBuf,
    algorithms: Vec<ChecksumAlgorithm>,
    info: Vec<(String, String)>,
}
impl Bag {
    /// Starts a bag in `dir`, creating its (empty) `data/` directory.
    pub fn create(dir: impl AsRef<Path>, algorithms: &[ChecksumAlgorithm]) -> Result<Self> {
        let dir = dir.as_ref().to_path_buf();
        let data = dir.join("data");
        std::fs::create_dir_all(&data).or_raise(|| ErrorKind::Io(data))?;
        let algorithms = match algorithms {
            [] => vec![ChecksumAlgorithm::Sha256],
            algorithms => algorithms.to_vec(),
        };
        Ok(Self { dir, algorithms, info: Vec::new() })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Adds a line to `bag-info.txt`, after `Bagging-Date` and `Payload-Oxum`.
    pub fn add_info(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.info.push((key.into(), value.into()));
    }

    /// Writes the bag declaration, info, payload manifests and finally the tag
    /// manifests over everything else outside `data/`.
    pub fn write(&self) -> Result<()> {
        self.write_tag("bagit.txt", BAGIT_TXT)?;
        self.write_tag("bag-info.txt", &self.bag_info()?)?;
        for algorithm in &self.algorithms {
            self.write_tag(&format!("manifest-{}.txt", algorithm.name()), "")?;
        }

        let tag_files = self.tag_files()?;
        for algorithm in &self.algorithms {
            let mut manifest = String::new();
            for relative in &tag_files {
                let path = self.dir.join(relative);
                let data = std::fs::read(&path).or_raise(|| ErrorKind::Io(path))?;
                // Infallible: writing to a String.
                _ = writeln!(manifest, "{}  {relative}", algorithm.digest(&data));
            }
            self.write_tag(&format!("tagmanifest-{}.txt", algorithm.name()), &manifest)?;
        }
        tracing::debug!(bag = %self.dir.display(), tag_files = tag_files.len(), "Wrote bag");
        Ok(())
    }

    fn bag_info(&self) -> Result<String> {
        let today = OffsetDateTime::now_utc()
            .date()
            .format(format_description!("[year]-[month]-[day]"))
            .or_raise(|| ErrorKind::Render("bag-info.txt".to_string()))?;
        let mut info = format!("Bagging-Date: {today}\nPayload-Oxum: 0.0\n");
        for (key, value) in &self.info {
            _ = writeln!(info, "{key}: {value}");
        }
        Ok(info)
    }

    fn write_tag(&self, name: &str, contents: &str) -> Result<()> {
        let path = self.dir.join(name);
        std::fs::write(&path, contents).or_raise(|| ErrorKind::Io(path))
    }

    /// Every file outside `data/` except the tag manifests themselves, as
    /// sorted `/`-separated paths relative to the bag.
    fn tag_files(&self) -> Result<Vec<String>> {
        let mut files = Vec::new();
        let mut pending = vec![self.dir.clone()];
        while let Some(dir) = pending.pop() {
            let entries = std::fs::read_dir(&dir).or_raise(|| ErrorKind::Io(dir.clone()))?;
            for entry in entries {
                let path = entry.or_raise(|| ErrorKind::Io(dir.clone()))?.path();
                let Ok(relative) = path.strip_prefix(&self.dir) else { continue };
                let relative =
                    relative.components().map(|c| c.as_os_str().to_string_lossy()).collect::<Vec<_>>().join("/");
                if path.is_dir() {
                    if relative != "data" {
                        pending.push(path);
                    }
                } else if !relative.starts_with("tagmanifest-") {
                    files.push(relative);
                }
            }
        }
        files.sort();
        Ok(files)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::*;
    use std::ops::Deref;

    #[rstest]
    #[case("sha256", ChecksumAlgorithm::Sha256)]
    #[case("SHA-256", ChecksumAlgorithm::Sha256)]
    #[case("sha512", ChecksumAlgorithm::Sha512)]
    fn parses_algorithm_names(#[case] name: &str, #[case] expected: ChecksumAlgorithm) {
        assert_eq!(name.parse::<ChecksumAlgorithm>().unwrap(), expected);
    }

    #[test]
    fn rejects_unknown_algorithms() {
        let err = "md5".parse::<ChecksumAlgorithm>().unwrap_err();
        assert_eq!(*err.deref(), ErrorKind::UnsupportedAlgorithm("md5".to_string()));
    }

    #[test]
    fn digests_are_lowercase_hex() {
        assert_eq!(
            ChecksumAlgorithm::Sha256.digest(b""),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
        assert_eq!(ChecksumAlgorithm::Sha512.digest(b"").len(), 128);
    }

    #[test]
    fn writes_an_empty_payload_bag() {
        let dir = tempfile::tempdir().unwrap();
        let mut bag = Bag::create(dir.path(), &[]).unwrap();
        bag.add_info("Created", "2024-01-01T10:00:00Z");
        std::fs::create_dir(dir.path().join("metadata")).unwrap();
        std::fs::write(dir.path().join("metadata/files.xml"), "<files />").unwrap();
        bag.write().unwrap();

        assert!(dir.path().join("data").is_dir());
        assert_eq!(std::fs::read_dir(dir.path().join("data")).unwrap().count(), 0);
        assert_eq!(std::fs::read_to_string(dir.path().join("bagit.txt")).unwrap(), BAGIT_TXT);
        assert_eq!(std::fs::read_to_string(dir.path().join("manifest-sha256.txt")).unwrap(), "");

        let info = std::fs::read_to_string(dir.path().join("bag-info.txt")).unwrap();
        assert!(info.starts_with("Bagging-Date: "));
        assert!(info.contains("Payload-Oxum: 0.0\n"));
        assert!(info.ends_with("Created: 2024-01-01T10:00:00Z\n"));

        let tags = std::fs::read_to_string(dir.path().join("tagmanifest-sha256.txt")).unwrap();
        let listed: Vec<_> = tags.lines().filter_map(|l| l.split_once("  ")).map(|(_, p)| p).collect();
        assert_eq!(listed, vec!["bag-info.txt", "bagit.txt", "manifest-sha256.txt", "metadata/files.xml"]);
        assert!(tags.contains(&format!("{}  metadata/files.xml", ChecksumAlgorithm::Sha256.digest(b"<files />"))));
    }

    #[test]
    fn one_manifest_pair_per_algorithm() {
        let dir = tempfile::tempdir().unwrap();
        let bag = Bag::create(dir.path(), &[ChecksumAlgorithm::Sha256, ChecksumAlgorithm::Sha512]).unwrap();
        bag.write().unwrap();
        for name in ["manifest-sha256.txt", "manifest-sha512.txt", "tagmanifest-sha256.txt", "tagmanifest-sha512.txt"] {
            assert!(dir.path().join(name).is_file(), "{name}");
        }
        let tags = std::fs::read_to_string(dir.path().join("tagmanifest-sha512.txt")).unwrap();
        assert!(tags.contains("manifest-sha512.txt"));
        assert!(!tags.contains("tagmanifest"));
    }
}
