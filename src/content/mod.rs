//! The phase corpus: manifests and markdown documents per locale.
//!
//! A [`Corpus`] always has a complete default-locale (English) layer: a
//! manifest plus one document for each of the nine phases. Other locales are
//! partial overlays. A locale without its own document for a phase reads the
//! default document, and a locale without its own manifest reads the default
//! manifest.
//!
//! On disk the layout is `<root>/<locale>/manifest.json` and
//! `<root>/<locale>/phase_<id>.md`. The same files ship inside the binary
//! and back [`Corpus::bundled`].

mod extract;
mod suggest;

use std::collections::HashMap;
use std::fmt;
use std::path::Path;

pub use extract::{extract_section, is_heading_marker, is_section_marker, HEADING_PREFIX};
pub use suggest::{levenshtein, suggest, MAX_SUGGESTION_DISTANCE};

use crate::error::{ContentError, CorpusError};
use crate::models::{Manifest, PhaseId, PHASE_COUNT};

/// A supported content language.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Locale {
    #[default]
    En,
    Ja,
}

impl Locale {
    pub const ALL: [Locale; 2] = [Locale::En, Locale::Ja];

    /// Resolve a two-letter tag. Unrecognized tags fall back to English.
    pub fn resolve(tag: &str) -> Self {
        match tag.trim().to_lowercase().as_str() {
            "ja" => Self::Ja,
            _ => Self::En,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::En => "en",
            Self::Ja => "ja",
        }
    }

    pub fn is_default(&self) -> bool {
        *self == Self::default()
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

macro_rules! bundled {
    ($locale:literal, $file:literal) => {
        include_str!(concat!(
            env!("CARGO_MANIFEST_DIR"),
            "/content/",
            $locale,
            "/",
            $file
        ))
    };
}

const BUNDLED_EN_MANIFEST: &str = bundled!("en", "manifest.json");
const BUNDLED_EN: [&str; PHASE_COUNT] = [
    bundled!("en", "phase_0.md"),
    bundled!("en", "phase_1.md"),
    bundled!("en", "phase_2.md"),
    bundled!("en", "phase_3.md"),
    bundled!("en", "phase_4.md"),
    bundled!("en", "phase_5.md"),
    bundled!("en", "phase_6.md"),
    bundled!("en", "phase_7.md"),
    bundled!("en", "phase_8.md"),
];

const BUNDLED_JA_MANIFEST: &str = bundled!("ja", "manifest.json");
const BUNDLED_JA: [(u8, &str); 2] = [
    (0, bundled!("ja", "phase_0.md")),
    (1, bundled!("ja", "phase_1.md")),
];

/// Manifest and documents for one locale layer.
#[derive(Debug, Clone)]
struct Overlay {
    manifest: Option<Manifest>,
    documents: HashMap<PhaseId, String>,
}

/// Read-only phase corpus. Cheap to share behind an `Arc`.
#[derive(Debug, Clone)]
pub struct Corpus {
    manifest: Manifest,
    documents: Vec<String>,
    overlays: HashMap<Locale, Overlay>,
}

impl Corpus {
    /// Build the default-locale layer. `documents[i]` is the text of phase `i`.
    pub fn new(manifest: Manifest, documents: Vec<String>) -> Result<Self, CorpusError> {
        if documents.len() < PHASE_COUNT {
            return Err(CorpusError::MissingDocument(documents.len() as u8));
        }
        if documents.len() > PHASE_COUNT {
            return Err(CorpusError::ExtraDocuments(documents.len()));
        }
        Ok(Self {
            manifest,
            documents,
            overlays: HashMap::new(),
        })
    }

    /// Add a partial layer for a non-default locale.
    pub fn with_locale(
        mut self,
        locale: Locale,
        manifest: Option<Manifest>,
        documents: impl IntoIterator<Item = (PhaseId, String)>,
    ) -> Self {
        self.overlays.insert(
            locale,
            Overlay {
                manifest,
                documents: documents.into_iter().collect(),
            },
        );
        self
    }

    /// The corpus compiled into the binary.
    pub fn bundled() -> Result<Self, CorpusError> {
        let documents = BUNDLED_EN.iter().map(|d| d.to_string()).collect();
        let corpus = Self::new(Manifest::from_json(BUNDLED_EN_MANIFEST)?, documents)?;

        let ja_documents = BUNDLED_JA
            .iter()
            .filter_map(|(id, text)| PhaseId::new(*id).map(|id| (id, text.to_string())));
        Ok(corpus.with_locale(
            Locale::Ja,
            Some(Manifest::from_json(BUNDLED_JA_MANIFEST)?),
            ja_documents,
        ))
    }

    /// Load a corpus laid out as `<root>/<locale>/{manifest.json,phase_<id>.md}`.
    ///
    /// The default locale directory must be complete. Other locale
    /// directories are optional and may be partial.
    pub fn from_dir(root: &Path) -> Result<Self, CorpusError> {
        let default_dir = root.join(Locale::default().as_str());
        let manifest = Manifest::from_json(&read_file(&default_dir.join("manifest.json"))?)?;

        let mut documents = Vec::with_capacity(PHASE_COUNT);
        for id in PhaseId::all() {
            let path = default_dir.join(document_file_name(id));
            if !path.exists() {
                return Err(CorpusError::MissingDocument(id.get()));
            }
            documents.push(read_file(&path)?);
        }

        let mut corpus = Self::new(manifest, documents)?;
        for locale in Locale::ALL.into_iter().filter(|l| !l.is_default()) {
            let dir = root.join(locale.as_str());
            if !dir.is_dir() {
                continue;
            }

            let manifest_path = dir.join("manifest.json");
            let manifest = if manifest_path.exists() {
                Some(Manifest::from_json(&read_file(&manifest_path)?)?)
            } else {
                None
            };

            let mut documents = Vec::new();
            for id in PhaseId::all() {
                let path = dir.join(document_file_name(id));
                if path.exists() {
                    documents.push((id, read_file(&path)?));
                }
            }

            tracing::debug!(
                "Loaded {} overlay with {} documents from {}",
                locale,
                documents.len(),
                dir.display()
            );
            corpus = corpus.with_locale(locale, manifest, documents);
        }

        Ok(corpus)
    }

    /// Manifest for `locale`, falling back to the default manifest.
    pub fn manifest(&self, locale: Locale) -> &Manifest {
        self.overlays
            .get(&locale)
            .and_then(|o| o.manifest.as_ref())
            .unwrap_or(&self.manifest)
    }

    /// Full text of a phase document, falling back to the default locale.
    pub fn document(&self, id: PhaseId, locale: Locale) -> &str {
        self.overlays
            .get(&locale)
            .and_then(|o| o.documents.get(&id))
            .map(String::as_str)
            .unwrap_or(self.documents[id.index()].as_str())
    }

    /// Extract one section of a phase document.
    pub fn section(
        &self,
        id: PhaseId,
        section_name: &str,
        locale: Locale,
    ) -> Result<String, ContentError> {
        extract_section(
            self.document(id, locale),
            section_name,
            self.manifest(locale).phase(id),
        )
    }

    /// Every manifest heading that its document does not contain, across all
    /// locales.
    pub fn integrity_errors(&self) -> Vec<(Locale, ContentError)> {
        let mut errors = Vec::new();
        for locale in Locale::ALL {
            let manifest = self.manifest(locale);
            for id in PhaseId::all() {
                for section in &manifest.phase(id).sections {
                    if let Err(e) = self.section(id, &section.name, locale) {
                        errors.push((locale, e));
                    }
                }
            }
        }
        errors
    }
}

fn document_file_name(id: PhaseId) -> String {
    format!("phase_{}.md", id)
}

fn read_file(path: &Path) -> Result<String, CorpusError> {
    std::fs::read_to_string(path).map_err(|source| CorpusError::Io {
        path: path.to_path_buf(),
        source,
    })
}
