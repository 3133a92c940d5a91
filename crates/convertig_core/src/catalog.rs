//! Static format catalog: extension → category, category/subcategory → targets.
use std::fmt;

use serde::Serialize;

/// Image extensions the conversion service can turn into a PDF.
pub const PDF_SOURCE_IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png"];

/// Two-level classification root. The wire label (`type` in the format
/// request) is the lowercase name returned by [`Category::label`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Image,
    Pdfs,
    Document,
    Audio,
    Video,
    Archive,
    Ebook,
}

impl Category {
    pub const ALL: [Category; 7] = [
        Category::Image,
        Category::Pdfs,
        Category::Document,
        Category::Audio,
        Category::Video,
        Category::Archive,
        Category::Ebook,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Category::Image => "image",
            Category::Pdfs => "pdfs",
            Category::Document => "document",
            Category::Audio => "audio",
            Category::Video => "video",
            Category::Archive => "archive",
            Category::Ebook => "ebook",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

struct Subcategory {
    name: &'static str,
    targets: &'static [&'static str],
}

const EBOOK_TARGETS: &[&str] = &["AZW3", "EPUB", "FB2", "LIT", "LRF", "MOBI", "PDB", "TCR"];

const IMAGE: &[Subcategory] = &[
    Subcategory {
        name: "image",
        targets: &["BMP", "EPS", "GIF", "ICO", "JPG", "PNG", "SVG", "TGA", "WBMP"],
    },
    Subcategory {
        name: "compressor",
        targets: &["JPG", "PNG", "SVG"],
    },
    Subcategory {
        name: "pdf",
        targets: &["PDF"],
    },
];

const PDFS: &[Subcategory] = &[
    Subcategory {
        name: "document",
        targets: &["DOCX"],
    },
    Subcategory {
        name: "compressor",
        targets: &["PDF"],
    },
    Subcategory {
        name: "ebook",
        targets: EBOOK_TARGETS,
    },
    Subcategory {
        name: "pdf_ebook",
        targets: EBOOK_TARGETS,
    },
    Subcategory {
        name: "pdf_to_image",
        targets: &["JPG", "PNG", "GIF"],
    },
];

const AUDIO: &[Subcategory] = &[Subcategory {
    name: "audio",
    targets: &[
        "AAC", "AIFF", "FLAC", "M4V", "MMF", "OGG", "OPUS", "WAV", "WMA", "3G2",
    ],
}];

const VIDEO: &[Subcategory] = &[
    Subcategory {
        name: "video",
        targets: &[
            "3G2", "3GP", "AVI", "FLV", "MKV", "MOV", "MPG", "OGV", "WEBM", "WMV",
        ],
    },
    Subcategory {
        name: "audio",
        targets: &[
            "AAC", "AIFF", "FLAC", "M4V", "MMF", "MP3", "OGG", "OPUS", "WAV", "WMA", "3G2",
        ],
    },
    Subcategory {
        name: "device",
        targets: &[
            "ANDROID",
            "BLACKBERRY",
            "IPAD",
            "IPHONE",
            "IPOD",
            "PLAYSTATION",
            "PSP",
            "WII",
            "XBOX",
        ],
    },
    Subcategory {
        name: "compressor",
        targets: &["MP4"],
    },
    Subcategory {
        name: "webservice",
        targets: &[
            "DAILYMOTION",
            "FACEBOOK",
            "INSTAGRAM",
            "TELEGRAM",
            "TWITCH",
            "TWITTER",
            "VIBER",
            "VIMEO",
            "WHATSAPP",
            "YOUTUBE",
        ],
    },
];

// Flat categories expose a single subcategory named after the category.
const DOCUMENT: &[Subcategory] = &[Subcategory {
    name: "document",
    targets: &["DOCX", "PDF", "TXT", "RTF", "ODT"],
}];

const ARCHIVE: &[Subcategory] = &[Subcategory {
    name: "archive",
    targets: &["ZIP", "7Z"],
}];

const EBOOK: &[Subcategory] = &[Subcategory {
    name: "ebook",
    targets: &["EPUB", "MOBI", "PDF", "AZW3"],
}];

fn table(category: Category) -> &'static [Subcategory] {
    match category {
        Category::Image => IMAGE,
        Category::Pdfs => PDFS,
        Category::Document => DOCUMENT,
        Category::Audio => AUDIO,
        Category::Video => VIDEO,
        Category::Archive => ARCHIVE,
        Category::Ebook => EBOOK,
    }
}

/// Lowercased text after the last `.` of a file name, or `""` when there is none.
pub fn extension_of(name: &str) -> String {
    match name.rsplit_once('.') {
        Some((_, ext)) => ext.to_ascii_lowercase(),
        None => String::new(),
    }
}

/// Classify an extension. Unrecognized extensions fall back to
/// [`Category::Image`]; see [`is_known_extension`] to tell the two apart.
pub fn category_of(extension: &str) -> Category {
    lookup(extension).unwrap_or(Category::Image)
}

/// Whether `extension` has an explicit row in the catalog.
pub fn is_known_extension(extension: &str) -> bool {
    lookup(extension).is_some()
}

fn lookup(extension: &str) -> Option<Category> {
    let ext = extension.to_ascii_lowercase();
    let category = match ext.as_str() {
        "pdf" => Category::Pdfs,
        "bmp" | "eps" | "gif" | "ico" | "png" | "svg" | "tga" | "tiff" | "wbmp" | "webp"
        | "jpg" | "jpeg" => Category::Image,
        "doc" | "docx" | "txt" | "rtf" | "odt" | "html" | "ppt" | "pptx" | "xlsx" => {
            Category::Document
        }
        "mp3" | "wav" | "aac" | "flac" | "ogg" | "opus" | "wma" | "aiff" | "m4v" | "mmf"
        | "3g2" => Category::Audio,
        "mp4" | "avi" | "mov" | "webm" | "mkv" | "flv" | "wmv" | "3gp" | "mpg" | "ogv" => {
            Category::Video
        }
        "zip" | "7z" => Category::Archive,
        "epub" | "mobi" | "azw3" | "fb2" | "lit" | "lrf" | "pdb" | "tcr" => Category::Ebook,
        _ => return None,
    };
    Some(category)
}

/// Subcategory names of `category`, in picker order.
pub fn subcategories_of(category: Category) -> Vec<&'static str> {
    table(category).iter().map(|sub| sub.name).collect()
}

/// First subcategory of `category`; the picker shows it when nothing is selected.
pub fn default_subcategory(category: Category) -> &'static str {
    table(category)[0].name
}

/// Ordered target labels for a subcategory; empty when the pair is unknown.
pub fn targets_of(category: Category, subcategory: &str) -> &'static [&'static str] {
    table(category)
        .iter()
        .find(|sub| sub.name == subcategory)
        .map(|sub| sub.targets)
        .unwrap_or(&[])
}

pub fn is_valid_target(category: Category, subcategory: &str, format: &str) -> bool {
    targets_of(category, subcategory)
        .iter()
        .any(|target| target.eq_ignore_ascii_case(format))
}

/// Whether an image with this extension may take the PDF-producing path.
pub fn accepts_pdf_source(extension: &str) -> bool {
    let ext = extension.to_ascii_lowercase();
    PDF_SOURCE_IMAGE_EXTENSIONS.contains(&ext.as_str())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extension_is_lowercased_last_segment() {
        assert_eq!(extension_of("Photo.Final.PNG"), "png");
        assert_eq!(extension_of("archive.tar.gz"), "gz");
        assert_eq!(extension_of("README"), "");
    }

    #[test]
    fn known_extensions_map_to_their_rows() {
        assert_eq!(category_of("pdf"), Category::Pdfs);
        assert_eq!(category_of("JPEG"), Category::Image);
        assert_eq!(category_of("html"), Category::Document);
        assert_eq!(category_of("3g2"), Category::Audio);
        assert_eq!(category_of("3gp"), Category::Video);
        assert_eq!(category_of("7z"), Category::Archive);
        assert_eq!(category_of("tcr"), Category::Ebook);
    }

    #[test]
    fn unknown_extension_falls_back_to_image() {
        assert_eq!(category_of("xyz"), Category::Image);
        assert_eq!(category_of(""), Category::Image);
        assert!(!is_known_extension("xyz"));
        assert!(is_known_extension("png"));
    }

    #[test]
    fn subcategories_keep_picker_order() {
        assert_eq!(
            subcategories_of(Category::Pdfs),
            vec!["document", "compressor", "ebook", "pdf_ebook", "pdf_to_image"]
        );
        assert_eq!(subcategories_of(Category::Document), vec!["document"]);
        assert_eq!(default_subcategory(Category::Video), "video");
    }

    #[test]
    fn targets_follow_table_order() {
        assert_eq!(targets_of(Category::Image, "pdf"), &["PDF"]);
        assert_eq!(targets_of(Category::Archive, "archive"), &["ZIP", "7Z"]);
        assert_eq!(targets_of(Category::Video, "compressor"), &["MP4"]);
        assert!(targets_of(Category::Image, "device").is_empty());
    }

    #[test]
    fn every_category_has_a_non_empty_default() {
        for category in Category::ALL {
            let sub = default_subcategory(category);
            assert!(!targets_of(category, sub).is_empty(), "{category}");
        }
    }

    #[test]
    fn target_validation_is_case_insensitive() {
        assert!(is_valid_target(Category::Document, "document", "pdf"));
        assert!(!is_valid_target(Category::Document, "pdf", "PDF"));
    }

    #[test]
    fn pdf_source_whitelist() {
        assert!(accepts_pdf_source("JPG"));
        assert!(accepts_pdf_source("png"));
        assert!(!accepts_pdf_source("gif"));
        assert!(!accepts_pdf_source("webp"));
    }
}
