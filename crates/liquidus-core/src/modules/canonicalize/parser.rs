use crate::common::normalize::{clean_phase_label, parse_number, parse_optional_number};
use crate::domain::{LiquidusError, ParserResult};
use std::collections::HashMap;

#[derive(Debug, Clone, PartialEq, Default)]
pub struct ExportDocument {
    pub formula: String,
    pub reactants: Vec<ReactantDefinition>,
    pub solutions: Vec<SolutionDefinition>,
    pub solid_species: Vec<SpeciesDefinition>,
    pub pages: Vec<ExportPage>,
}

impl ExportDocument {
    pub fn solution(&self, phase_id: &str) -> Option<&SolutionDefinition> {
        self.solutions
            .iter()
            .find(|solution| solution.phase_id == phase_id)
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct ReactantDefinition {
    pub id: String,
    pub name: String,
    pub molar_mass: f64,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct SolutionDefinition {
    pub phase_id: String,
    pub label: String,
    pub species: Vec<SpeciesDefinition>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct SpeciesDefinition {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SpeciesResult {
    pub mass_g: f64,
    pub weight_fraction: f64,
    pub mole_amount: f64,
    pub mole_fraction: f64,
    pub activity: f64,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct ExportPage {
    pub id: Option<String>,
    pub description: String,
    /// Raw `T` attribute in kelvin, present only when non-blank.
    pub temperature_k: Option<f64>,
    /// Raw `P` attribute in bar, present only when non-blank.
    pub pressure_bar: Option<f64>,
    pub reactant_moles: Vec<(String, f64)>,
    pub solution_masses: Vec<(String, f64)>,
    pub results: HashMap<String, SpeciesResult>,
}

impl ExportPage {
    pub fn reactant_moles(&self, reactant_id: &str) -> Option<f64> {
        self.reactant_moles
            .iter()
            .find(|(id, _)| id == reactant_id)
            .map(|(_, moles)| *moles)
    }
}

pub fn parse_export_document(source: &str) -> ParserResult<ExportDocument> {
    let options = roxmltree::ParsingOptions {
        allow_dtd: true,
        ..roxmltree::ParsingOptions::default()
    };
    let document = roxmltree::Document::parse_with_options(source, options).map_err(|error| {
        LiquidusError::input_validation(
            "INPUT.XML_PARSE",
            format!("export is not well-formed XML: {}", error),
        )
    })?;
    let root = document.root_element();

    let header = child_elements(root, "header").next();
    let mut export = ExportDocument {
        formula: root.attribute("formula").unwrap_or_default().to_string(),
        ..ExportDocument::default()
    };

    if let Some(header) = header {
        for reactant in child_elements(header, "reactant") {
            let Some(id) = reactant.attribute("id") else {
                tracing::warn!("skipping header reactant without an id attribute");
                continue;
            };
            let parsed = ReactantDefinition {
                id: id.to_string(),
                name: reactant.attribute("name").unwrap_or_default().to_string(),
                molar_mass: parse_optional_number(reactant.attribute("mw")),
            };
            upsert_by(&mut export.reactants, parsed, |existing, new| {
                existing.id == new.id
            });
        }

        for definition in child_elements(header, "species_definition").take(1) {
            for solution in child_elements(definition, "solution") {
                let phase_id = solution.attribute("phase_id").unwrap_or_default();
                let parsed = SolutionDefinition {
                    phase_id: phase_id.to_string(),
                    label: clean_phase_label(solution.attribute("state").unwrap_or_default())
                        .to_string(),
                    species: child_elements(solution, "species")
                        .filter_map(species_definition)
                        .collect(),
                };
                upsert_by(&mut export.solutions, parsed, |existing, new| {
                    existing.phase_id == new.phase_id
                });
            }
        }
    }

    for species in root
        .descendants()
        .filter(|node| node.has_tag_name("species") && node.attribute("phase") == Some("s"))
    {
        if let Some(solid) = species_definition(species) {
            upsert_by(&mut export.solid_species, solid, |existing, new| {
                existing.id == new.id
            });
        }
    }

    export.pages = child_elements(root, "page").map(parse_page).collect();
    Ok(export)
}

fn parse_page(page: roxmltree::Node<'_, '_>) -> ExportPage {
    let mut parsed = ExportPage {
        id: page.attribute("id").map(str::to_string),
        description: page
            .attribute("description")
            .unwrap_or_default()
            .trim()
            .to_string(),
        temperature_k: non_blank(page.attribute("T")).map(parse_number),
        pressure_bar: non_blank(page.attribute("P")).map(parse_number),
        ..ExportPage::default()
    };

    for reactant in child_elements(page, "reactant") {
        let Some(id) = reactant.attribute("id") else {
            continue;
        };
        // Only the first instance of a reactant on a page counts.
        if parsed.reactant_moles(id).is_none() {
            parsed
                .reactant_moles
                .push((id.to_string(), parse_optional_number(reactant.attribute("n"))));
        }
    }

    for solution in child_elements(page, "solution") {
        let Some(id) = solution.attribute("id") else {
            tracing::warn!("skipping page solution without an id attribute");
            continue;
        };
        let mass = parse_optional_number(solution.attribute("g"));
        match parsed
            .solution_masses
            .iter_mut()
            .find(|(existing, _)| existing == id)
        {
            Some(entry) => entry.1 = mass,
            None => parsed.solution_masses.push((id.to_string(), mass)),
        }
    }

    for result in child_elements(page, "result") {
        let Some(id) = result.attribute("id") else {
            tracing::warn!("skipping page result without an id attribute");
            continue;
        };
        parsed.results.insert(
            id.to_string(),
            SpeciesResult {
                mass_g: parse_optional_number(result.attribute("g")),
                weight_fraction: parse_optional_number(result.attribute("W")),
                mole_amount: parse_optional_number(result.attribute("n")),
                mole_fraction: parse_optional_number(result.attribute("X")),
                activity: parse_optional_number(result.attribute("a")),
            },
        );
    }

    parsed
}

fn species_definition(species: roxmltree::Node<'_, '_>) -> Option<SpeciesDefinition> {
    let Some(id) = species.attribute("id") else {
        tracing::warn!("skipping species definition without an id attribute");
        return None;
    };
    Some(SpeciesDefinition {
        id: id.to_string(),
        name: species.attribute("name").unwrap_or_default().to_string(),
    })
}

fn child_elements<'a, 'input: 'a>(
    node: roxmltree::Node<'a, 'input>,
    name: &'static str,
) -> impl Iterator<Item = roxmltree::Node<'a, 'input>> {
    node.children()
        .filter(move |child| child.is_element() && child.has_tag_name(name))
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|trimmed| !trimmed.is_empty())
}

/// Replaces a matching entry in place, keeping its original position.
fn upsert_by<T>(entries: &mut Vec<T>, entry: T, matches: impl Fn(&T, &T) -> bool) {
    match entries.iter().position(|existing| matches(existing, &entry)) {
        Some(index) => entries[index] = entry,
        None => entries.push(entry),
    }
}
