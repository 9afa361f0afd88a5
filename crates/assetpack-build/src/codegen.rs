//! # Code Generation
//!
//! Renders the build model into a Rust source file that reconstructs the
//! bundle at run time:
//!
//! ```text
//! // Code generated by assetpack. DO NOT EDIT.
//! // const BundleVersion = "<hex>"
//!
//! use std::time::{Duration, UNIX_EPOCH};
//!
//! use assetpack_bundle::{Bundle, CachePolicy, Resource};
//!
//! pub const BUNDLE_VERSION: &str = "<hex>";
//!
//! pub fn bundle() -> Bundle { Bundle::new(vec![Resource::new(..), ..]) }
//!
//! pub mod names { pub const INDEX_HTML: &str = "/index.html"; }
//!
//! const BLOB_<HEX>: &str = "<payload>";
//! ```
//!
//! Resources are emitted in name order and blobs in digest order, so equal
//! inputs always render byte-identical output.

use std::collections::BTreeSet;
use std::fmt::{self, Write as _};
use std::time::{SystemTime, UNIX_EPOCH};

use assetpack_bundle::CachePolicy;

use crate::blob::{BlobRef, BlobStore};
use crate::error::BuildError;
use crate::naming::const_ident;
use crate::version::marker_line;

/// First line of every generated file.
pub const GENERATED_HEADER: &str = "// Code generated by assetpack. DO NOT EDIT.";

/// Build-time description of one resource.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceEntry {
    pub name: String,
    pub size: u64,
    pub mode: u32,
    pub modified: SystemTime,
    pub sha256_hex: String,
    pub policy: CachePolicy,
    pub blob: BlobRef,
}

/// Render the generated source.
pub fn render(
    package: &str,
    version: &str,
    resources: &[ResourceEntry],
    blobs: &BlobStore,
) -> Result<String, BuildError> {
    let mut sorted: Vec<&ResourceEntry> = resources.iter().collect();
    sorted.sort_by(|a, b| a.name.cmp(&b.name));

    let mut out = String::with_capacity(blobs.encoded_bytes() as usize + 256 * sorted.len() + 512);
    render_into(&mut out, package, version, &sorted, blobs)?;
    Ok(out)
}

fn render_into(
    out: &mut String,
    package: &str,
    version: &str,
    sorted: &[&ResourceEntry],
    blobs: &BlobStore,
) -> fmt::Result {
    writeln!(out, "{GENERATED_HEADER}")?;
    writeln!(out, "// {}", marker_line(version))?;
    writeln!(out)?;
    writeln!(out, "//! Embedded assets of `{package}`.")?;
    writeln!(out)?;
    writeln!(out, "use std::time::{{Duration, UNIX_EPOCH}};")?;
    writeln!(out)?;
    writeln!(out, "use assetpack_bundle::{{Bundle, CachePolicy, Resource}};")?;
    writeln!(out)?;
    writeln!(out, "/// Digest of the embedded input set and build options.")?;
    writeln!(out, "pub const BUNDLE_VERSION: &str = {version:?};")?;
    writeln!(out)?;

    writeln!(out, "/// Construct the bundle of all {} embedded resources.", sorted.len())?;
    writeln!(out, "pub fn bundle() -> Bundle {{")?;
    writeln!(out, "    Bundle::new(vec![")?;
    for entry in sorted {
        render_resource(out, entry)?;
    }
    writeln!(out, "    ])")?;
    writeln!(out, "}}")?;
    writeln!(out)?;

    writeln!(out, "/// Resource names as constants.")?;
    writeln!(out, "pub mod names {{")?;
    for (ident, name) in name_constants(sorted) {
        writeln!(out, "    pub const {ident}: &str = {name:?};")?;
    }
    writeln!(out, "}}")?;

    for blob in blobs.blobs() {
        writeln!(out)?;
        writeln!(
            out,
            "const {}: &str = \"{}\";",
            blob.blob_ref().const_name(),
            blob.encoded()
        )?;
    }
    Ok(())
}

fn render_resource(out: &mut String, entry: &ResourceEntry) -> fmt::Result {
    let since_epoch = entry
        .modified
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default();
    let CachePolicy {
        unpacked,
        brotli,
        gzip,
    } = entry.policy;

    writeln!(out, "        Resource::new(")?;
    writeln!(out, "            {:?},", entry.name)?;
    writeln!(out, "            {},", entry.size)?;
    writeln!(out, "            0o{:o},", entry.mode)?;
    writeln!(
        out,
        "            UNIX_EPOCH + Duration::new({}, {}),",
        since_epoch.as_secs(),
        since_epoch.subsec_nanos()
    )?;
    writeln!(out, "            {:?},", entry.sha256_hex)?;
    writeln!(out, "            CachePolicy::new({unpacked}, {brotli}, {gzip}),")?;
    writeln!(out, "            {},", entry.blob.const_name())?;
    writeln!(out, "        ),")
}

/// Identifier per resource name, unique within the `names` module.
///
/// A taken identifier gets the smallest free `_N` suffix (N >= 2), in name
/// order. The suffixed form is itself checked against every identifier
/// already emitted.
fn name_constants<'a>(sorted: &[&'a ResourceEntry]) -> Vec<(String, &'a str)> {
    let mut taken: BTreeSet<String> = BTreeSet::new();
    sorted
        .iter()
        .map(|entry| {
            let base = const_ident(&entry.name);
            let mut ident = base.clone();
            let mut n = 2usize;
            while taken.contains(&ident) {
                ident = format!("{base}_{n}");
                n += 1;
            }
            taken.insert(ident.clone());
            (ident, entry.name.as_str())
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use crate::version::extract_embedded_version;

    fn model() -> (Vec<ResourceEntry>, BlobStore) {
        let mut store = BlobStore::new();
        let shared = store.add_payload(b"shared").unwrap();
        let other = store.add_payload(b"other").unwrap();
        let entry = |name: &str, blob: BlobRef| ResourceEntry {
            name: name.to_string(),
            size: 6,
            mode: 0o644,
            modified: UNIX_EPOCH + Duration::new(1_700_000_000, 5),
            sha256_hex: blob.digest().to_hex(),
            policy: CachePolicy::new(true, false, true),
            blob,
        };
        (
            vec![
                entry("/z.txt", shared),
                entry("/a-b.txt", other),
                entry("/a_b.txt", shared),
            ],
            store,
        )
    }

    #[test]
    fn header_and_marker_lead_the_file() {
        let (resources, store) = model();
        let src = render("assets", "deadbeef", &resources, &store).unwrap();
        let mut lines = src.lines();
        assert_eq!(lines.next(), Some(GENERATED_HEADER));
        assert_eq!(lines.next(), Some("// const BundleVersion = \"deadbeef\""));
        assert!(src.contains("pub const BUNDLE_VERSION: &str = \"deadbeef\";"));
    }

    #[test]
    fn marker_is_readable_by_the_gate() {
        let (resources, store) = model();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("assets.rs");
        std::fs::write(&path, render("assets", "cafe", &resources, &store).unwrap()).unwrap();
        assert_eq!(extract_embedded_version(&path).unwrap().as_deref(), Some("cafe"));
    }

    #[test]
    fn resources_sorted_and_blobs_emitted_once() {
        let (resources, store) = model();
        let src = render("assets", "v", &resources, &store).unwrap();

        let first = src.find("\"/a-b.txt\",").unwrap();
        let second = src.find("\"/a_b.txt\",").unwrap();
        let third = src.find("\"/z.txt\",").unwrap();
        assert!(first < second && second < third);

        for blob in store.blobs() {
            let decl = format!("const {}: &str = ", blob.blob_ref().const_name());
            assert_eq!(src.matches(&decl).count(), 1);
        }
        assert_eq!(src.matches("Resource::new(").count(), 3);
    }

    #[test]
    fn resource_fields_are_rendered() {
        let (resources, store) = model();
        let src = render("assets", "v", &resources, &store).unwrap();
        assert!(src.contains("            0o644,\n"));
        assert!(src.contains("UNIX_EPOCH + Duration::new(1700000000, 5),"));
        assert!(src.contains("CachePolicy::new(true, false, true),"));
    }

    #[test]
    fn colliding_name_constants_get_suffixes() {
        let (resources, store) = model();
        let src = render("assets", "v", &resources, &store).unwrap();
        assert!(src.contains("pub const A_B_TXT: &str = \"/a-b.txt\";"));
        assert!(src.contains("pub const A_B_TXT_2: &str = \"/a_b.txt\";"));
        assert!(src.contains("pub const Z_TXT: &str = \"/z.txt\";"));
    }

    #[test]
    fn suffixed_constants_skip_identifiers_already_taken() {
        let mut store = BlobStore::new();
        let blob = store.add_payload(b"x").unwrap();
        let entry = |name: &str| ResourceEntry {
            name: name.to_string(),
            size: 1,
            mode: 0o644,
            modified: UNIX_EPOCH,
            sha256_hex: blob.digest().to_hex(),
            policy: CachePolicy::ALL,
            blob,
        };
        let resources = vec![entry("/a-b.txt"), entry("/a_b.txt"), entry("/a_b_txt_2")];
        let src = render("assets", "v", &resources, &store).unwrap();

        let idents: Vec<&str> = src
            .lines()
            .filter_map(|l| l.strip_prefix("    pub const "))
            .filter_map(|l| l.split(':').next())
            .collect();
        let unique: BTreeSet<&str> = idents.iter().copied().collect();
        assert_eq!(idents.len(), 3);
        assert_eq!(unique.len(), 3, "duplicate identifiers: {idents:?}");
        assert!(src.contains("pub const A_B_TXT: &str = \"/a-b.txt\";"));
        assert!(src.contains("pub const A_B_TXT_2: &str = \"/a_b.txt\";"));
        assert!(src.contains("pub const A_B_TXT_2_2: &str = \"/a_b_txt_2\";"));
    }

    #[test]
    fn names_with_quotes_are_escaped() {
        let mut store = BlobStore::new();
        let blob = store.add_payload(b"x").unwrap();
        let resources = vec![ResourceEntry {
            name: "/say \"hi\".txt".into(),
            size: 1,
            mode: 0o600,
            modified: UNIX_EPOCH,
            sha256_hex: blob.digest().to_hex(),
            policy: CachePolicy::ALL,
            blob,
        }];
        let src = render("assets", "v", &resources, &store).unwrap();
        assert!(src.contains(r#""/say \"hi\".txt""#));
    }

    #[test]
    fn rendering_is_deterministic() {
        let (mut resources, store) = model();
        let a = render("assets", "v", &resources, &store).unwrap();
        resources.reverse();
        let b = render("assets", "v", &resources, &store).unwrap();
        assert_eq!(a, b);
    }
}
