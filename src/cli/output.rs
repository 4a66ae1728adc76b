//! Output formatting for CLI commands.
//!
//! This module handles formatting output as either JSON or human-readable text.

use myvote::{Answer, KeyValidation, QueryDescriptor, Voter};
use serde::Serialize;

fn print_json<T: Serialize + ?Sized>(value: &T) {
    match serde_json::to_string_pretty(value) {
        Ok(json) => println!("{}", json),
        Err(e) => eprintln!("Failed to serialize output: {}", e),
    }
}

/// Print a transliteration.
pub fn print_transliteration(input: &str, output: &str, json: bool) {
    if json {
        print_json(&serde_json::json!({ "input": input, "output": output }));
    } else {
        println!("{}", output);
    }
}

/// Print matching voters.
pub fn print_voters(voters: &[&Voter], terms: &[String], json: bool) {
    if json {
        print_json(voters);
        return;
    }

    if terms.len() > 1 {
        println!("Searched for: {}\n", terms.join(", "));
    }

    if voters.is_empty() {
        println!("No voters found.");
        return;
    }

    println!("Found {} voters\n", voters.len());
    for voter in voters {
        let sl_no = voter.sl_no.as_ref().map(ToString::to_string).unwrap_or_default();
        println!("{:>4}. {}", sl_no, voter.name);

        let mut details = Vec::new();
        if let Some(house) = &voter.house_name {
            details.push(format!("House: {}", house));
        }
        if let Some(guardian) = &voter.guardian_name {
            details.push(format!("Guardian: {}", guardian));
        }
        if let Some(card) = &voter.id_card_no {
            details.push(format!("ID: {}", card));
        }
        if let Some(age) = &voter.age {
            details.push(format!("Age: {}", age));
        }
        if !details.is_empty() {
            println!("      {}", details.join(" | "));
        }
    }
}

/// Print a parsed descriptor.
pub fn print_descriptor(descriptor: &QueryDescriptor, json: bool) {
    if json {
        print_json(descriptor);
        return;
    }

    println!("Type: {}", descriptor.intent);
    if let Some(table) = descriptor.table {
        println!("Table: {}", table);
    }
    for filter in &descriptor.filters {
        println!("Filter: {} {} {}", filter.column, filter.operator, filter.value);
    }
    if let Some(limit) = descriptor.limit {
        println!("Limit: {}", limit);
    }
}

/// Print an assistant answer.
pub fn print_answer(answer: &Answer, json: bool) {
    if json {
        print_json(answer);
    } else {
        println!("{}", answer.text);
    }
}

/// Print name variants.
pub fn print_variants(variants: &[String], json: bool) {
    if json {
        print_json(variants);
    } else {
        for variant in variants {
            println!("{}", variant);
        }
    }
}

/// Print an API key check.
pub fn print_key_validation(validation: &KeyValidation, json: bool) {
    if json {
        print_json(validation);
    } else if validation.is_valid {
        println!("API key is valid.");
    } else {
        println!(
            "API key is invalid: {}",
            validation.error.as_deref().unwrap_or("unknown error")
        );
    }
}
