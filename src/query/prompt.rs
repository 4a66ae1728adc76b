//! Prompt contract for the intent parser.
//!
//! The schema section is rendered from [`Table`] and [`FilterOp`], so the
//! model is only ever told about tables, columns and operators the validator
//! will accept.

use std::fmt::Write;

use super::types::{FilterOp, Table};

/// Version of the schema description sent to the model.
pub const SCHEMA_VERSION: u32 = 1;

// ============================================================================
// Classification keywords
// ============================================================================

/// Phrases that ask for a count (English, Malayalam, Manglish).
pub const COUNT_KEYWORDS: &[&str] = &[
    "how many",
    "count",
    "total",
    "number of",
    "എത്ര",
    "എണ്ണം",
    "ആകെ",
    "ethra",
    "ennam",
    "aake",
];

/// Phrases that ask for rows.
pub const LIST_KEYWORDS: &[&str] = &[
    "list",
    "show",
    "details",
    "who is",
    "search",
    "find",
    "which",
    "കാണിക്കുക",
    "വിവരങ്ങൾ",
    "ആരാണ്",
    "ഏത്",
    "കണ്ടെത്തുക",
    "kanikku",
    "vivarangal",
    "aaranu",
    "eth",
];

/// Greetings and small talk that need no data.
pub const GENERAL_KEYWORDS: &[&str] = &[
    "hi",
    "hello",
    "thanks",
    "thank you",
    "help",
    "നമസ്കാരം",
    "നന്ദി",
    "സഹായം",
    "namaskaram",
    "nanni",
];

/// Terms mapped to `gender = 'Male'`.
pub const MALE_TERMS: &[&str] = &[
    "male",
    "males",
    "man",
    "men",
    "പുരുഷൻ",
    "പുരുഷന്മാർ",
    "ആണുങ്ങൾ",
    "purushan",
    "purushanmar",
    "aanungal",
];

/// Terms mapped to `gender = 'Female'`.
pub const FEMALE_TERMS: &[&str] = &[
    "female",
    "females",
    "woman",
    "women",
    "സ്ത്രീ",
    "സ്ത്രീകൾ",
    "പെണ്ണുങ്ങൾ",
    "sthree",
    "sthreekal",
    "pennungal",
];

/// Columns matched with `ilike` rather than `eq`.
pub const FUZZY_COLUMNS: &[&str] = &["name", "house_name", "guardian_name"];

fn column_hint(table: Table, column: &str) -> Option<&'static str> {
    match (table, column) {
        (Table::Voters, "gender") => Some("'Male', 'Female'"),
        (Table::Voters, "status") => Some("'Active', 'delete', 'shifted'"),
        _ => None,
    }
}

fn quoted(words: &[&str]) -> String {
    words
        .iter()
        .map(|w| format!("\"{}\"", w))
        .collect::<Vec<_>>()
        .join(", ")
}

// ============================================================================
// Rendering
// ============================================================================

/// Render the parse prompt for a question.
pub fn render_parse_prompt(question: &str) -> String {
    let mut prompt = String::new();

    prompt.push_str(
        "You are a database query parser for a Voter Management System in Kerala.\n\
         Convert the user's question into a JSON object describing a database query.\n\n",
    );

    let _ = writeln!(prompt, "Database Schema (version {}):", SCHEMA_VERSION);
    for table in Table::ALL {
        let columns: Vec<String> = table
            .columns()
            .iter()
            .map(|c| match column_hint(table, c) {
                Some(hint) => format!("{} ({})", c, hint),
                None => c.to_string(),
            })
            .collect();
        let _ = writeln!(prompt, "- {}: {}", table, columns.join(", "));
    }

    let tables = Table::ALL
        .iter()
        .map(|t| format!("\"{}\"", t))
        .collect::<Vec<_>>()
        .join(" | ");
    let operators = FilterOp::ALL
        .iter()
        .map(|op| format!("\"{}\"", op))
        .collect::<Vec<_>>()
        .join(" | ");

    let _ = write!(
        prompt,
        "\nOutput JSON Format:\n\
         {{\n  \"type\": \"count\" | \"list\" | \"general\",\n  \
         \"table\": {} | null,\n  \
         \"filters\": [{{ \"column\": \"column_name\", \"operator\": {}, \"value\": \"value\" }}],\n  \
         \"limit\": number\n}}\n\n",
        tables, operators
    );

    prompt.push_str("Rules:\n");
    let _ = writeln!(
        prompt,
        "- If the question is a greeting or needs no data ({}), set \"type\": \"general\" and \"table\": null.",
        quoted(GENERAL_KEYWORDS)
    );
    let _ = writeln!(
        prompt,
        "- If the user asks for a number ({}), set \"type\": \"count\".",
        quoted(COUNT_KEYWORDS)
    );
    let _ = writeln!(
        prompt,
        "- If the user asks to see records ({}), set \"type\": \"list\".",
        quoted(LIST_KEYWORDS)
    );
    let _ = writeln!(
        prompt,
        "- ALWAYS use \"ilike\" for {} so matches are case-insensitive and partial.",
        quoted(FUZZY_COLUMNS)
    );
    let _ = writeln!(
        prompt,
        "- Map {} to gender = 'Male' and {} to gender = 'Female'.",
        quoted(MALE_TERMS),
        quoted(FEMALE_TERMS)
    );
    prompt.push_str(
        "- Understand Manglish (e.g. \"Jithuvinte booth eth\" -> table \"voters\", name ilike \"Jithu\").\n\
         - Names are stored in English. If the user writes a name in Malayalam (e.g. \"ജിത്തു\"), \
         transliterate it to English (e.g. \"Jithu\") for the value.\n\
         - Use \"id_card_no\" for ID card searches and \"sl_no\" for serial numbers.\n\
         - Only use the tables, columns and operators listed above.\n\
         - Omit \"limit\" unless the user asks for a specific number of results.\n\
         - Return ONLY the JSON object. No markdown formatting.\n\n",
    );

    let _ = write!(prompt, "User Question: \"{}\"", question);
    prompt
}
