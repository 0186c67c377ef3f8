//! Persona defect tolerance.
//!
//! Each persona maps to one [`ExpectedDeviation`]. An interaction's [`Observation`]
//! is classified against that entry as nominal, a known (asserted-for) defect, or an
//! unexpected failure. Observations a deviation does not speak to fall back to the
//! nominal rules.

use std::collections::HashMap;
use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{Result, UnexpectedDefectError};
use crate::model::persona::Persona;
use crate::pages::login::LOCKED_OUT;

/// Upper bound for a login that is not expected to be slow.
pub const NOMINAL_LOGIN_BOUND: Duration = Duration::from_millis(2_000);
/// Upper bound for a login that is expected to be slow.
pub const SLOW_LOGIN_BOUND: Duration = Duration::from_millis(7_000);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Classification {
    Nominal,
    KnownDefect,
    UnexpectedFailure,
}

impl fmt::Display for Classification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Classification::Nominal => "nominal",
            Classification::KnownDefect => "known defect",
            Classification::UnexpectedFailure => "unexpected failure",
        })
    }
}

/// What was measured during one interaction.
#[derive(Debug, Clone, PartialEq)]
pub enum Observation {
    LoginDuration(Duration),
    LoginRejected { message: String },
    /// `src` of every catalog image, in display order
    CatalogImages(Vec<String>),
    RemoveAndSort { remove_failed: bool, sort_failed: bool },
    /// Comparison against the standard persona's baseline. `position_differs` is
    /// `None` when a bounding box could not be read for either persona.
    VisualComparison {
        image_differs: bool,
        position_differs: Option<bool>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ExpectedDeviation {
    None,
    /// Correct credentials are refused with exactly this banner
    LoginRefused { message: String },
    /// Every catalog image resolves to the same asset
    IdenticalImages,
    /// Login lands, but slower than nominal: `(nominal_ms, outer_ms]`
    SlowLogin { nominal_ms: u64, outer_ms: u64 },
    /// Cart removal and/or sorting fails
    BrokenRemoveOrSort,
    /// Some image or element position differs from the standard persona
    VisualDifference,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Verdict {
    pub classification: Classification,
    pub detail: String,
}

impl Verdict {
    fn new(classification: Classification, detail: impl Into<String>) -> Self {
        Self {
            classification,
            detail: detail.into(),
        }
    }
}

impl ExpectedDeviation {
    pub fn classify(&self, observation: &Observation) -> Verdict {
        use Classification::*;

        match (self, observation) {
            (
                ExpectedDeviation::LoginRefused { message: expected },
                Observation::LoginRejected { message },
            ) => {
                if message == expected {
                    Verdict::new(KnownDefect, format!("login refused: {}", message))
                } else {
                    Verdict::new(
                        UnexpectedFailure,
                        format!("login refused with {:?}, expected {:?}", message, expected),
                    )
                }
            }
            (ExpectedDeviation::LoginRefused { .. }, Observation::LoginDuration(d)) => {
                Verdict::new(
                    UnexpectedFailure,
                    format!("login was expected to be refused but landed in {:?}", d),
                )
            }

            (ExpectedDeviation::IdenticalImages, Observation::CatalogImages(srcs)) => {
                let unique = unique_count(srcs);
                if unique == 1 {
                    Verdict::new(
                        KnownDefect,
                        format!("all {} images share one asset", srcs.len()),
                    )
                } else {
                    Verdict::new(
                        UnexpectedFailure,
                        format!("expected one shared image, found {} distinct", unique),
                    )
                }
            }

            (
                ExpectedDeviation::SlowLogin {
                    nominal_ms,
                    outer_ms,
                },
                Observation::LoginDuration(d),
            ) => {
                let ms = d.as_millis();
                let band = format!("({}ms, {}ms]", nominal_ms, outer_ms);
                if ms > u128::from(*nominal_ms) && ms <= u128::from(*outer_ms) {
                    Verdict::new(KnownDefect, format!("slow login {}ms in {}", ms, band))
                } else {
                    Verdict::new(
                        UnexpectedFailure,
                        format!("login took {}ms, expected {}", ms, band),
                    )
                }
            }

            (
                ExpectedDeviation::BrokenRemoveOrSort,
                Observation::RemoveAndSort {
                    remove_failed,
                    sort_failed,
                },
            ) => {
                if *remove_failed || *sort_failed {
                    Verdict::new(
                        KnownDefect,
                        format!(
                            "remove failed: {}, sort failed: {}",
                            remove_failed, sort_failed
                        ),
                    )
                } else {
                    Verdict::new(
                        UnexpectedFailure,
                        "expected remove or sort to fail, both worked",
                    )
                }
            }

            (
                ExpectedDeviation::VisualDifference,
                Observation::VisualComparison {
                    image_differs,
                    position_differs,
                },
            ) => {
                if *image_differs || *position_differs == Some(true) {
                    Verdict::new(
                        KnownDefect,
                        format!(
                            "image differs: {}, position differs: {:?}",
                            image_differs, position_differs
                        ),
                    )
                } else {
                    // Lenient until the fixture's flakiness is confirmed; see DESIGN.md.
                    tracing::warn!("no visual difference detected against the standard baseline");
                    Verdict::new(Nominal, "no visual difference detected (logged, not failed)")
                }
            }

            (_, observation) => nominal(observation),
        }
    }
}

/// Rules for observations with no tolerated deviation.
fn nominal(observation: &Observation) -> Verdict {
    use Classification::*;

    match observation {
        Observation::LoginDuration(d) if *d <= NOMINAL_LOGIN_BOUND => {
            Verdict::new(Nominal, format!("login in {}ms", d.as_millis()))
        }
        Observation::LoginDuration(d) => Verdict::new(
            UnexpectedFailure,
            format!(
                "login took {}ms, bound {}ms",
                d.as_millis(),
                NOMINAL_LOGIN_BOUND.as_millis()
            ),
        ),
        Observation::LoginRejected { message } => {
            Verdict::new(UnexpectedFailure, format!("login refused: {}", message))
        }
        Observation::CatalogImages(srcs) if unique_count(srcs) == srcs.len() => {
            Verdict::new(Nominal, format!("{} distinct images", srcs.len()))
        }
        Observation::CatalogImages(srcs) => Verdict::new(
            UnexpectedFailure,
            format!("{} images but only {} distinct", srcs.len(), unique_count(srcs)),
        ),
        Observation::RemoveAndSort {
            remove_failed: false,
            sort_failed: false,
        } => Verdict::new(Nominal, "remove and sort worked"),
        Observation::RemoveAndSort {
            remove_failed,
            sort_failed,
        } => Verdict::new(
            UnexpectedFailure,
            format!("remove failed: {}, sort failed: {}", remove_failed, sort_failed),
        ),
        Observation::VisualComparison {
            image_differs: false,
            position_differs,
        } if *position_differs != Some(true) => {
            Verdict::new(Nominal, "matches the standard baseline")
        }
        Observation::VisualComparison {
            image_differs,
            position_differs,
        } => Verdict::new(
            UnexpectedFailure,
            format!(
                "image differs: {}, position differs: {:?}",
                image_differs, position_differs
            ),
        ),
    }
}

fn unique_count(values: &[String]) -> usize {
    let mut sorted: Vec<&String> = values.iter().collect();
    sorted.sort();
    sorted.dedup();
    sorted.len()
}

/// Persona → expected deviation.
#[derive(Debug, Clone)]
pub struct ToleranceTable {
    entries: HashMap<Persona, ExpectedDeviation>,
}

impl Default for ToleranceTable {
    fn default() -> Self {
        Self::storefront()
    }
}

impl ToleranceTable {
    pub fn empty() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }

    /// The storefront's known persona behaviours.
    pub fn storefront() -> Self {
        Self::empty()
            .with(Persona::Standard, ExpectedDeviation::None)
            .with(
                Persona::LockedOut,
                ExpectedDeviation::LoginRefused {
                    message: LOCKED_OUT.to_string(),
                },
            )
            .with(Persona::Problem, ExpectedDeviation::IdenticalImages)
            .with(
                Persona::PerformanceGlitch,
                ExpectedDeviation::SlowLogin {
                    nominal_ms: NOMINAL_LOGIN_BOUND.as_millis() as u64,
                    outer_ms: SLOW_LOGIN_BOUND.as_millis() as u64,
                },
            )
            .with(Persona::Error, ExpectedDeviation::BrokenRemoveOrSort)
            .with(Persona::Visual, ExpectedDeviation::VisualDifference)
    }

    pub fn with(mut self, persona: Persona, deviation: ExpectedDeviation) -> Self {
        self.entries.insert(persona, deviation);
        self
    }

    /// Personas without an entry behave nominally.
    pub fn lookup(&self, persona: Persona) -> &ExpectedDeviation {
        self.entries.get(&persona).unwrap_or(&ExpectedDeviation::None)
    }

    pub fn classify(&self, persona: Persona, observation: &Observation) -> Verdict {
        self.lookup(persona).classify(observation)
    }

    /// Classify and turn an unexpected failure into an error.
    pub fn enforce(
        &self,
        persona: Persona,
        operation: &str,
        observation: &Observation,
    ) -> Result<Verdict> {
        let verdict = self.classify(persona, observation);
        match verdict.classification {
            Classification::UnexpectedFailure => Err(UnexpectedDefectError {
                persona,
                operation: operation.to_string(),
                detail: verdict.detail,
            }
            .into()),
            Classification::KnownDefect => {
                tracing::info!(%persona, operation, detail = %verdict.detail, "tolerated defect");
                Ok(verdict)
            }
            Classification::Nominal => Ok(verdict),
        }
    }

    pub fn entries(&self) -> impl Iterator<Item = (Persona, &ExpectedDeviation)> {
        Persona::ALL.into_iter().map(|p| (p, self.lookup(p)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pages::login::BAD_CREDENTIALS;

    fn ms(n: u64) -> Observation {
        Observation::LoginDuration(Duration::from_millis(n))
    }

    fn class(
        table: &ToleranceTable,
        persona: Persona,
        observation: &Observation,
    ) -> Classification {
        table.classify(persona, observation).classification
    }

    #[test]
    fn slow_login_band_is_half_open() {
        let table = ToleranceTable::storefront();
        let p = Persona::PerformanceGlitch;
        assert_eq!(class(&table, p, &ms(2_000)), Classification::UnexpectedFailure);
        assert_eq!(class(&table, p, &ms(2_001)), Classification::KnownDefect);
        assert_eq!(class(&table, p, &ms(7_000)), Classification::KnownDefect);
        assert_eq!(class(&table, p, &ms(7_001)), Classification::UnexpectedFailure);
    }

    #[test]
    fn locked_out_tolerates_only_the_locked_out_banner() {
        let table = ToleranceTable::storefront();
        let locked = Observation::LoginRejected {
            message: LOCKED_OUT.into(),
        };
        let wrong_password = Observation::LoginRejected {
            message: BAD_CREDENTIALS.into(),
        };
        assert_eq!(
            class(&table, Persona::LockedOut, &locked),
            Classification::KnownDefect
        );
        assert_eq!(
            class(&table, Persona::LockedOut, &wrong_password),
            Classification::UnexpectedFailure
        );
        assert!(
            table
                .enforce(Persona::LockedOut, "login", &wrong_password)
                .is_err()
        );
        assert_eq!(
            class(&table, Persona::LockedOut, &ms(300)),
            Classification::UnexpectedFailure
        );
    }

    #[test]
    fn identical_images_must_be_present_for_problem_persona() {
        let table = ToleranceTable::storefront();
        let same = Observation::CatalogImages(vec!["dog.jpg".into(); 6]);
        let distinct = Observation::CatalogImages(vec!["a.jpg".into(), "b.jpg".into()]);
        assert_eq!(class(&table, Persona::Problem, &same), Classification::KnownDefect);
        assert_eq!(
            class(&table, Persona::Problem, &distinct),
            Classification::UnexpectedFailure
        );
        assert_eq!(
            class(&table, Persona::Standard, &same),
            Classification::UnexpectedFailure
        );
        assert_eq!(class(&table, Persona::Standard, &distinct), Classification::Nominal);
    }

    #[test]
    fn error_persona_needs_at_least_one_symptom() {
        let table = ToleranceTable::storefront();
        let neither = Observation::RemoveAndSort {
            remove_failed: false,
            sort_failed: false,
        };
        let sort_only = Observation::RemoveAndSort {
            remove_failed: false,
            sort_failed: true,
        };
        assert!(table.enforce(Persona::Error, "remove_and_sort", &neither).is_err());
        assert_eq!(
            table
                .enforce(Persona::Error, "remove_and_sort", &sort_only)
                .unwrap()
                .classification,
            Classification::KnownDefect
        );
    }

    #[test]
    fn missing_visual_difference_is_not_a_failure() {
        let table = ToleranceTable::storefront();
        let none = Observation::VisualComparison {
            image_differs: false,
            position_differs: Some(false),
        };
        let verdict = table.enforce(Persona::Visual, "visual_baseline", &none).unwrap();
        assert_eq!(verdict.classification, Classification::Nominal);
    }

    #[test]
    fn table_extends_without_touching_callers() {
        let table =
            ToleranceTable::storefront().with(Persona::Visual, ExpectedDeviation::IdenticalImages);
        let same = Observation::CatalogImages(vec!["x.jpg".into(); 3]);
        assert_eq!(class(&table, Persona::Visual, &same), Classification::KnownDefect);
    }
}
