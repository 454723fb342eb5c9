//! Terminal output

use colored::*;

pub fn print_loaded_web_documents(count: usize) {
    println!("Loaded {} web documents.", count.to_string().bold());
}

pub fn print_total_characters(count: usize) {
    println!("Total characters: {}", count.to_string().bold());
}

pub fn print_answer(answer: &str) {
    println!("{}", answer.green());
}

pub fn print_error(error: &anyhow::Error) {
    eprintln!("{} {:#}", "Error:".red().bold(), error);
}
