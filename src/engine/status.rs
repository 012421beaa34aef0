use std::fmt;

use super::reconcile::Reconciliation;

/// Match verdict for one bill row. Vendor bills get a real verdict from
/// their reconciliation; company bill rows carry no reconciliation and
/// classify as [`MatchStatus::Info`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MatchStatus {
    /// Amounts agree and every listed reference resolved.
    Matched,
    /// Amounts disagree. An amount mismatch outranks missing links, so
    /// `missing` rides along as an annotation instead of changing the
    /// verdict.
    Mismatch { difference: f64, missing: usize },
    /// Amounts agree (possibly coincidentally) but references are
    /// missing, so the match cannot be trusted yet.
    Pending { missing: usize },
    /// No verdict applies.
    Info,
}

/// Classifies a reconciliation. The rules are ordered; the first one
/// that applies wins.
pub fn classify(reconciliation: Option<&Reconciliation>) -> MatchStatus {
    let Some(rec) = reconciliation else {
        return MatchStatus::Info;
    };

    if rec.matched && rec.missing_bills == 0 {
        MatchStatus::Matched
    } else if !rec.matched {
        // The reconciler already ruled on the gap; re-measuring it here
        // would disagree with the verdict right at the tolerance edge.
        MatchStatus::Mismatch {
            difference: rec.difference,
            missing: rec.missing_bills,
        }
    } else if rec.matched && rec.missing_bills > 0 {
        MatchStatus::Pending {
            missing: rec.missing_bills,
        }
    } else {
        MatchStatus::Info
    }
}

/// How a verdict renders: a one-character marker plus a color name the
/// host may map to its own palette.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusStyle {
    pub icon: &'static str,
    pub color: &'static str,
}

impl MatchStatus {
    /// Every variant has a style; adding a variant without one is a
    /// compile error.
    pub fn style(&self) -> StatusStyle {
        match self {
            MatchStatus::Matched => StatusStyle {
                icon: "✓",
                color: "green",
            },
            MatchStatus::Mismatch { .. } => StatusStyle {
                icon: "✗",
                color: "red",
            },
            MatchStatus::Pending { .. } => StatusStyle {
                icon: "…",
                color: "yellow",
            },
            MatchStatus::Info => StatusStyle {
                icon: "—",
                color: "dim",
            },
        }
    }
}

impl fmt::Display for MatchStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MatchStatus::Matched => write!(f, "Matched"),
            MatchStatus::Mismatch {
                difference,
                missing,
            } => {
                if *difference > 0.0 {
                    write!(f, "Vendor overstated by {:.2}", difference)?;
                } else {
                    write!(f, "Company bills overstate by {:.2}", difference.abs())?;
                }
                if *missing > 0 {
                    write!(f, " (+{missing} missing)")?;
                }
                Ok(())
            }
            MatchStatus::Pending { missing } => write!(f, "Pending ({missing} missing)"),
            MatchStatus::Info => write!(f, "—"),
        }
    }
}
