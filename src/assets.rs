// src/assets.rs
//! Thumbnail assignment. Cannot fail: every path ends at a default asset.
//!
//! The pick is deterministic per title (SHA-256 prefix modulo table length),
//! so re-running an attempt for the same topic yields the same image.

use sha2::{Digest, Sha256};

use crate::types::Category;

pub const DEFAULT_THUMBNAIL: &str = "/images/thumbnails/default.jpg";

fn table(category: Category) -> &'static [&'static str] {
    match category {
        Category::Investing => &[
            "/images/thumbnails/investing-1.jpg",
            "/images/thumbnails/investing-2.jpg",
            "/images/thumbnails/investing-3.jpg",
        ],
        Category::Tax => &[
            "/images/thumbnails/tax-1.jpg",
            "/images/thumbnails/tax-2.jpg",
        ],
        Category::Retirement => &[
            "/images/thumbnails/retirement-1.jpg",
            "/images/thumbnails/retirement-2.jpg",
            "/images/thumbnails/retirement-3.jpg",
        ],
        Category::Budgeting => &[
            "/images/thumbnails/budgeting-1.jpg",
            "/images/thumbnails/budgeting-2.jpg",
        ],
        Category::Debt => &["/images/thumbnails/debt-1.jpg"],
        Category::RealEstate => &[
            "/images/thumbnails/real-estate-1.jpg",
            "/images/thumbnails/real-estate-2.jpg",
        ],
    }
}

fn stable_index(seed: &str, len: usize) -> usize {
    let digest = Sha256::digest(seed.as_bytes());
    let mut buf = [0u8; 8];
    buf.copy_from_slice(&digest[..8]);
    (u64::from_be_bytes(buf) % len as u64) as usize
}

pub fn pick_thumbnail(category: Category, title: &str) -> String {
    let options = table(category);
    if options.is_empty() {
        return DEFAULT_THUMBNAIL.to_string();
    }
    options[stable_index(title, options.len())].to_string()
}
