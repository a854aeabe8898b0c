use skill_forge::content::{suggest, Corpus, Locale};
use skill_forge::error::ContentError;
use skill_forge::models::*;
use skill_forge::search::{format_search_results, search};
use speculate2::speculate;

fn phase(id: u8) -> PhaseId {
    PhaseId::new(id).expect("valid phase id")
}

speculate! {
    before {
        let corpus = Corpus::bundled().expect("Failed to load bundled corpus");
    }

    describe "manifest" {
        it "has nine phases with ids matching their position" {
            let manifest = corpus.manifest(Locale::En);
            assert_eq!(manifest.phases().len(), PHASE_COUNT);
            for (index, phase) in manifest.phases().iter().enumerate() {
                assert_eq!(phase.id as usize, index);
            }
        }

        it "falls back to english names for an unknown locale tag" {
            let manifest = corpus.manifest(Locale::resolve("fr"));
            assert_eq!(manifest.phase(phase(0)).name, "SKILL.md Specification");
        }

        it "has localized names in japanese" {
            let manifest = corpus.manifest(Locale::Ja);
            assert_eq!(manifest.phase(phase(0)).name, "SKILL.md 仕様");
        }

        it "declares headings that exist in every locale" {
            assert_eq!(corpus.integrity_errors(), vec![]);
        }
    }

    describe "documents" {
        it "returns phase 0" {
            assert!(corpus.document(phase(0), Locale::En).contains("Phase 0"));
        }

        it "returns phase 8" {
            assert!(corpus
                .document(phase(8), Locale::En)
                .contains("Evaluation and Iteration"));
        }

        it "rejects ids outside 0-8" {
            for raw in ["-1", "9", "abc", ""] {
                let err = PhaseId::parse(raw).unwrap_err();
                assert!(matches!(err, ContentError::InvalidPhaseId(_)));
                assert!(err.to_string().contains("does not exist"));
            }
        }

        it "serves the translated document when one exists" {
            assert!(corpus.document(phase(0), Locale::Ja).contains("仕様"));
        }

        it "falls back to english for untranslated phases" {
            assert_eq!(
                corpus.document(phase(5), Locale::Ja),
                corpus.document(phase(5), Locale::En)
            );
        }
    }

    describe "sections" {
        it "extracts a named section" {
            let section = corpus
                .section(phase(0), "frontmatter", Locale::En)
                .expect("frontmatter section");
            assert!(section.starts_with("### Frontmatter"));
            assert!(section.len() < corpus.document(phase(0), Locale::En).len());
            assert!(!section.contains("### Progressive Disclosure"));
        }

        it "extracts the overview before the first heading" {
            let overview = corpus
                .section(phase(1), OVERVIEW_SECTION, Locale::En)
                .expect("overview");
            assert!(!overview.contains("### "));
            assert!(overview.contains("Phase 1"));
        }

        it "returns every declared section as non-empty text" {
            let manifest = corpus.manifest(Locale::En);
            for id in PhaseId::all() {
                for section in &manifest.phase(id).sections {
                    let text = corpus
                        .section(id, &section.name, Locale::En)
                        .expect("declared section");
                    assert!(text.starts_with(&section.marker()));
                }
            }
        }

        it "extracts japanese sections by their english names" {
            let section = corpus
                .section(phase(0), "frontmatter", Locale::Ja)
                .expect("frontmatter section");
            assert!(section.starts_with("### フロントマター"));
        }

        it "lists available sections for an unknown name" {
            let err = corpus
                .section(phase(0), "nonexistent", Locale::En)
                .unwrap_err();
            match err {
                ContentError::SectionNotFound { phase_id, available, suggestion, .. } => {
                    assert_eq!(phase_id, 0);
                    assert_eq!(available, corpus.manifest(Locale::En).phase(phase(0)).section_names());
                    assert!(available.contains(&"frontmatter".to_string()));
                    assert_eq!(suggestion, None);
                }
                other => panic!("unexpected error: {other:?}"),
            }
        }

        it "suggests the closest section for a typo" {
            let err = corpus.section(phase(0), "frontmat", Locale::En).unwrap_err();
            assert!(matches!(
                err,
                ContentError::SectionNotFound { suggestion: Some(ref s), .. } if s == "frontmatter"
            ));
        }
    }

    describe "suggest" {
        it "finds a name within distance 3" {
            let names = ["overview", "structure", "frontmatter", "skill-types"];
            assert_eq!(suggest("frontmat", &names[..]), Some("frontmatter"));
        }

        it "returns nothing when every name is too far" {
            let names = ["overview", "structure", "frontmatter"];
            assert_eq!(suggest("xyz", &names[..]), None);
        }
    }

    describe "search" {
        it "finds matches for frontmatter" {
            let hits = search(&corpus, Locale::En, "frontmatter", 5);
            assert!(!hits.is_empty());
            assert!(format_search_results("frontmatter", &hits).starts_with("Found"));
        }

        it "reports no matches for an unknown keyword" {
            let hits = search(&corpus, Locale::En, "xyz_nonexistent_xyz", 5);
            assert!(hits.is_empty());
            assert!(format_search_results("xyz_nonexistent_xyz", &hits).contains("No matches"));
        }

        it "is case-insensitive" {
            let lower = search(&corpus, Locale::En, "frontmatter", 50);
            let upper = search(&corpus, Locale::En, "FRONTMATTER", 50);
            assert_eq!(lower, upper);
        }

        it "respects the result cap" {
            assert_eq!(search(&corpus, Locale::En, "phase", 2).len(), 2);
        }

        it "returns located hits" {
            let hits = search(&corpus, Locale::En, "frontmatter", 1);
            assert_eq!(hits.len(), 1);
            assert!(hits[0].phase_id <= 8);
            assert!(hits[0].line_number > 0);
            assert!(hits[0].line_text.to_lowercase().contains("frontmatter"));
        }

        it "attributes a heading line to the section it opens" {
            let hits = search(&corpus, Locale::En, "### Frontmatter", 50);
            let heading = hits
                .iter()
                .find(|hit| hit.phase_id == 0 && hit.line_text == "### Frontmatter")
                .expect("heading hit");
            assert_eq!(heading.section_name, "frontmatter");
        }

        it "ignores empty and whitespace queries" {
            assert!(search(&corpus, Locale::En, "", 5).is_empty());
            assert!(search(&corpus, Locale::En, "   ", 5).is_empty());
        }
    }
}
