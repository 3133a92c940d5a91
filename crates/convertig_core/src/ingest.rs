use convertig_logging::cv_warn;

use crate::catalog::{self, Category};
use crate::error::{SourceRejection, MAX_ITEMS};
use crate::model::{IngestedFile, Origin};

/// Refuse an adapter call whose files would push the collection past [`MAX_ITEMS`].
pub fn check_capacity(tracked: usize, incoming: usize) -> Result<(), SourceRejection> {
    if tracked + incoming > MAX_ITEMS {
        return Err(SourceRejection::CapacityExceeded {
            tracked,
            incoming,
            max: MAX_ITEMS,
        });
    }
    Ok(())
}

/// Post-retrieval screening shared by every source adapter.
///
/// Images must be PDF-source compatible, because the image category always
/// offers the PDF-producing path.
pub fn screen(file: IngestedFile) -> Result<IngestedFile, SourceRejection> {
    let ext = file.extension();
    if !catalog::is_known_extension(&ext) {
        cv_warn!(
            "unrecognized extension {:?} for {}; classified as image",
            ext,
            file.name()
        );
    }
    if catalog::category_of(&ext) == Category::Image && !catalog::accepts_pdf_source(&ext) {
        return Err(SourceRejection::UnsupportedPdfSource {
            name: file.name().to_string(),
        });
    }
    Ok(file)
}

/// Outcome of one adapter call: files that passed screening and the
/// rejections raised along the way.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IngestReport {
    pub origin: Origin,
    pub requested: usize,
    pub accepted: Vec<IngestedFile>,
    pub rejected: Vec<SourceRejection>,
}

impl IngestReport {
    pub fn new(origin: Origin, requested: usize) -> Self {
        Self {
            origin,
            requested,
            accepted: Vec::new(),
            rejected: Vec::new(),
        }
    }

    /// A report refusing the entire call.
    pub fn refused(origin: Origin, requested: usize, rejection: SourceRejection) -> Self {
        Self {
            rejected: vec![rejection],
            ..Self::new(origin, requested)
        }
    }

    /// Screen `file` and file it under accepted or rejected.
    pub fn admit(&mut self, file: IngestedFile) {
        match screen(file) {
            Ok(file) => self.accepted.push(file),
            Err(rejection) => self.rejected.push(rejection),
        }
    }

    pub fn reject(&mut self, rejection: SourceRejection) {
        self.rejected.push(rejection);
    }

    /// User-facing line for the diagnostic banner, `None` when everything was added.
    pub fn summary(&self) -> Option<String> {
        match self.rejected.as_slice() {
            [] => None,
            [only] => Some(only.to_string()),
            [first, ..] if first.is_batch_level() => Some(first.to_string()),
            _ => Some(
                "Some files were not added due to unsupported formats for PDF conversion."
                    .to_string(),
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn local(name: &str) -> IngestedFile {
        IngestedFile::new(name, "application/octet-stream", &b"x"[..], Origin::Local, None)
    }

    #[test]
    fn capacity_counts_tracked_and_incoming() {
        assert!(check_capacity(0, 5).is_ok());
        assert!(check_capacity(3, 2).is_ok());
        assert_eq!(
            check_capacity(4, 2),
            Err(SourceRejection::CapacityExceeded {
                tracked: 4,
                incoming: 2,
                max: 5
            })
        );
    }

    #[test]
    fn screening_rejects_non_pdf_source_images() {
        assert!(screen(local("photo.png")).is_ok());
        assert!(screen(local("photo.JPEG")).is_ok());
        assert!(screen(local("report.pdf")).is_ok());
        assert!(screen(local("song.mp3")).is_ok());
        assert_eq!(
            screen(local("anim.gif")),
            Err(SourceRejection::UnsupportedPdfSource {
                name: "anim.gif".to_string()
            })
        );
    }

    #[test]
    fn unknown_extensions_are_screened_as_images() {
        assert!(screen(local("notes.xyz")).is_err());
        assert!(screen(local("Makefile")).is_err());
    }

    #[test]
    fn summary_prefers_the_single_reason() {
        let mut report = IngestReport::new(Origin::Local, 3);
        report.admit(local("a.png"));
        assert_eq!(report.summary(), None);

        report.admit(local("b.gif"));
        assert_eq!(
            report.summary().unwrap(),
            "File b.gif has an unsupported format for PDF conversion. Use JPG, JPEG, or PNG."
        );

        report.admit(local("c.bmp"));
        assert_eq!(
            report.summary().unwrap(),
            "Some files were not added due to unsupported formats for PDF conversion."
        );
    }
}
