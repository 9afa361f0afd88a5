// Code generated by assetpack. DO NOT EDIT.
// const BundleVersion = "4f1c0a0e8f3b5d2a9c7e6b1d0a2f4e3c5b7a9d8e6f1c3b2a4d5e7f9a0b1c2d3e"

//! Embedded assets of `site_assets`.

use std::time::{Duration, UNIX_EPOCH};

use assetpack_bundle::{Bundle, CachePolicy, Resource};

/// Digest of the embedded input set and build options.
pub const BUNDLE_VERSION: &str = "4f1c0a0e8f3b5d2a9c7e6b1d0a2f4e3c5b7a9d8e6f1c3b2a4d5e7f9a0b1c2d3e";

/// Construct the bundle of all 5 embedded resources.
pub fn bundle() -> Bundle {
    Bundle::new(vec![
        Resource::new(
            "/a-b.txt",
            5,
            0o644,
            UNIX_EPOCH + Duration::new(1700000000, 0),
            "a6328afc76e9db71da297ebff4b0d3e7a7eb3b01d917c05a6573fef121b6ecb6",
            CachePolicy::new(true, false, true),
            BLOB_A6328AFC76E9DB71DA297EBFF4B0D3E7A7EB3B01D917C05A6573FEF121B6ECB6,
        ),
        Resource::new(
            "/a_b.txt",
            5,
            0o644,
            UNIX_EPOCH + Duration::new(1700000000, 0),
            "a6328afc76e9db71da297ebff4b0d3e7a7eb3b01d917c05a6573fef121b6ecb6",
            CachePolicy::new(true, false, true),
            BLOB_A6328AFC76E9DB71DA297EBFF4B0D3E7A7EB3B01D917C05A6573FEF121B6ECB6,
        ),
        Resource::new(
            "/a_b_txt_2",
            6,
            0o644,
            UNIX_EPOCH + Duration::new(1700000000, 0),
            "7e4fa2eb8c7ac089739d5defc4489fad68a100d92082ca35c6b40a4524821f87",
            CachePolicy::new(true, false, true),
            BLOB_7E4FA2EB8C7AC089739D5DEFC4489FAD68A100D92082CA35C6B40A4524821F87,
        ),
        Resource::new(
            "/css/app.css",
            19,
            0o644,
            UNIX_EPOCH + Duration::new(1700000000, 0),
            "0a8af8e447f8df77b986d4935f35eb961bf92930d45ab5fe3403311b3d430422",
            CachePolicy::new(true, false, true),
            BLOB_0A8AF8E447F8DF77B986D4935F35EB961BF92930D45AB5FE3403311B3D430422,
        ),
        Resource::new(
            "/index.html",
            32,
            0o644,
            UNIX_EPOCH + Duration::new(1700000000, 0),
            "b5929ec031c6e9689f217302db43d9a56dd26b8e50c737702e7762bd764efb02",
            CachePolicy::new(true, false, true),
            BLOB_B5929EC031C6E9689F217302DB43D9A56DD26B8E50C737702E7762BD764EFB02,
        ),
    ])
}

/// Resource names as constants.
pub mod names {
    pub const A_B_TXT: &str = "/a-b.txt";
    pub const A_B_TXT_2: &str = "/a_b.txt";
    pub const A_B_TXT_2_2: &str = "/a_b_txt_2";
    pub const CSS_APP_CSS: &str = "/css/app.css";
    pub const INDEX_HTML: &str = "/index.html";
}

const BLOB_0A8AF8E447F8DF77B986D4935F35EB961BF92930D45AB5FE3403311B3D430422: &str = "IAEQaDEgeyBjb2xvcjogdGVhbCB9CgM=";

const BLOB_7E4FA2EB8C7AC089739D5DEFC4489FAD68A100D92082CA35C6B40A4524821F87: &str = "UAAQb3RoZXIKAw==";

const BLOB_A6328AFC76E9DB71DA297EBFF4B0D3E7A7EB3B01D917C05A6573FEF121B6ECB6: &str = "QAAQc2FtZQoD";

const BLOB_B5929EC031C6E9689F217302DB43D9A56DD26B8E50C737702E7762BD764EFB02: &str = "8AEQPCFkb2N0eXBlIGh0bWw+PGgxPmZpeHR1cmU8L2gxPgoD";
