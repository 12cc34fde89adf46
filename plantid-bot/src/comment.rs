use crate::types::{Candidate, IdentificationResult};
use crate::utils::text::{escape_table_cell, format_percentage};

/// At most this many candidates make it into the table.
pub const MAX_TABLE_ROWS: usize = 5;

/// Shown when the service knows no common name for a species.
pub const MISSING_COMMON_NAME: &str = "/";

/// One line of the candidate table, before markdown formatting.
#[derive(Debug, Clone, PartialEq)]
pub struct TableRow {
    pub common_name: String,
    pub scientific_name: String,
    pub likeliness: String,
}

impl From<&Candidate> for TableRow {
    fn from(candidate: &Candidate) -> Self {
        Self {
            common_name: candidate
                .common_name
                .clone()
                .filter(|name| !name.trim().is_empty())
                .unwrap_or_else(|| MISSING_COMMON_NAME.to_string()),
            scientific_name: candidate.scientific_name.clone(),
            likeliness: format_percentage(candidate.score),
        }
    }
}

/// Rows for the top candidates, in service order. No re-sorting happens here.
pub fn table_rows(result: &IdentificationResult) -> Vec<TableRow> {
    result
        .candidates
        .iter()
        .take(MAX_TABLE_ROWS)
        .map(TableRow::from)
        .collect()
}

pub fn render_table(rows: &[TableRow]) -> String {
    let mut table = String::from("|Common name|Scientific name|Likeliness|\n|-|-|-|\n");
    for row in rows {
        table.push_str(&format!(
            "|{}|{}|{}|\n",
            escape_table_cell(&row.common_name),
            escape_table_cell(&row.scientific_name),
            row.likeliness
        ));
    }
    table
}

pub fn render_comment(result: &IdentificationResult) -> String {
    format!(
        "**Automatic identification via PlantNet summary**\n\
         \n\
         Most likely match: **{}**\n\
         \n\
         {}\n\
         Beep, boop\n\
         \n\
         I'm a bot, and this action was performed automatically.\n",
        escape_table_cell(&result.best_match),
        render_table(&table_rows(result)),
    )
}
