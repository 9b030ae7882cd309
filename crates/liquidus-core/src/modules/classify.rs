//! Heuristic chemistry categories for phase and pure-solid labels.
//!
//! Solution-phase labels are matched case-insensitively. Pure-solid labels
//! keep their element capitalization (`FeSi2(s)`, `SiO2(s)`) and are matched
//! case-sensitively, so the two label kinds follow different rules.

const CRYSTAL_STRUCTURE_TAGS: [&str; 3] = ["bcc", "fcc", "hcp"];
const SOLID_SUFFIX: &str = "(s)";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PhaseCategory {
    MetalLiquid,
    SlagLiquid,
    MetalIntermetallic,
    SlagSolid,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LabelKind {
    SolutionPhase,
    PureSolid,
}

impl PhaseCategory {
    pub fn matches(self, label: &str, kind: LabelKind) -> bool {
        match (self, kind) {
            (Self::MetalLiquid, LabelKind::SolutionPhase) => is_metal_liquid_phase(label),
            (Self::SlagLiquid, LabelKind::SolutionPhase) => is_slag_liquid_phase(label),
            (Self::MetalIntermetallic, LabelKind::SolutionPhase) => {
                is_metal_intermetallic_phase(label)
            }
            (Self::MetalIntermetallic, LabelKind::PureSolid) => {
                is_metal_intermetallic_pure_solid(label)
            }
            (Self::SlagSolid, LabelKind::SolutionPhase) => is_slag_solid_phase(label),
            (Self::SlagSolid, LabelKind::PureSolid) => is_slag_pure_solid(label),
            (Self::MetalLiquid | Self::SlagLiquid, LabelKind::PureSolid) => false,
        }
    }
}

pub fn is_metal_liquid_phase(label: &str) -> bool {
    let lower = label.to_lowercase();
    lower.contains("fe-liq") || lower.contains("liquid")
}

pub fn is_slag_liquid_phase(label: &str) -> bool {
    let lower = label.to_lowercase();
    lower.contains("slag") && lower.contains("liq")
}

pub fn is_metal_intermetallic_phase(label: &str) -> bool {
    let lower = label.to_lowercase();
    if lower.contains("liq") || lower.contains("slag") {
        return false;
    }
    has_crystal_structure_tag(&lower)
        || (lower.contains("fe") && lower.contains("si") && !lower.contains('o'))
}

pub fn is_metal_intermetallic_pure_solid(label: &str) -> bool {
    let raw = label.replace(SOLID_SUFFIX, "");
    raw.contains("Fe") && raw.contains("Si") && !raw.contains('O')
}

/// Any solid solution whose name contains an `o` is treated as an oxide.
/// This over-matches and is kept as the agreed rule.
pub fn is_slag_solid_phase(label: &str) -> bool {
    let lower = label.to_lowercase();
    if lower.contains("liq") {
        return false;
    }
    lower.contains("slag") || lower.contains('o')
}

pub fn is_slag_pure_solid(label: &str) -> bool {
    label.contains('O')
}

fn has_crystal_structure_tag(lower: &str) -> bool {
    lower
        .split(|character: char| !character.is_ascii_alphanumeric())
        .any(|word| CRYSTAL_STRUCTURE_TAGS.contains(&word))
}
