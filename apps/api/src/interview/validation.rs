//! Per-step input validation. Every check returns the normalized value or a
//! `ValidationError` whose message is shown to the candidate verbatim.

use thiserror::Error;

/// Longest accepted input for the information-collection steps.
pub const MAX_INPUT_CHARS: usize = 1000;
/// Technical answers longer than this are truncated, not rejected.
pub const MAX_ANSWER_CHARS: usize = 5000;

/// Upper bound on declared technologies. Three questions each must fit in
/// one model response.
pub const MAX_TECH_STACK: usize = 10;

const MAX_YEARS_EXPERIENCE: u32 = 60;
const MIN_PHONE_DIGITS: usize = 7;

const EXIT_KEYWORDS: &[&str] = &["exit", "quit", "bye", "goodbye", "stop", "end"];

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Please enter your {field}.")]
    Empty { field: &'static str },

    #[error("Your message is too long ({len} characters, limit {max}). Please shorten it.")]
    TooLong { len: usize, max: usize },

    #[error("Please provide your full name (at least 2 characters).")]
    InvalidName,

    #[error("That doesn't look like a valid email address.")]
    InvalidEmail,

    #[error("That doesn't look like a valid phone number.")]
    InvalidPhone,

    #[error("Please give your years of experience as a whole number, e.g. 3.")]
    InvalidExperience,

    #[error("Please list at least one technology, separated by commas.")]
    EmptyTechStack,

    #[error("You listed {count} technologies. Please name your top {max}.")]
    TooManyTechnologies { count: usize, max: usize },
}

pub fn check_length(input: &str) -> Result<(), ValidationError> {
    let len = input.chars().count();
    if len > MAX_INPUT_CHARS {
        return Err(ValidationError::TooLong {
            len,
            max: MAX_INPUT_CHARS,
        });
    }
    Ok(())
}

/// Truncates an answer to `MAX_ANSWER_CHARS`, on a char boundary.
pub fn truncate_answer(input: &str) -> (String, bool) {
    let trimmed = input.trim();
    match trimmed.char_indices().nth(MAX_ANSWER_CHARS) {
        Some((cut, _)) => (trimmed[..cut].to_string(), true),
        None => (trimmed.to_string(), false),
    }
}

pub fn validate_name(input: &str) -> Result<String, ValidationError> {
    let name = collapse_whitespace(input);
    if name.chars().count() < 2 {
        return Err(ValidationError::InvalidName);
    }
    Ok(name)
}

/// Accepts `local@domain.tld` where the TLD has at least two letters.
pub fn validate_email(input: &str) -> Result<String, ValidationError> {
    let email = input.trim();
    let (local, domain) = email.split_once('@').ok_or(ValidationError::InvalidEmail)?;

    let local_ok = !local.is_empty()
        && local
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || "._%+-".contains(c));
    let domain_ok = match domain.rsplit_once('.') {
        Some((host, tld)) => {
            !host.is_empty()
                && host
                    .chars()
                    .all(|c| c.is_ascii_alphanumeric() || c == '.' || c == '-')
                && tld.len() >= 2
                && tld.chars().all(|c| c.is_ascii_alphabetic())
        }
        None => false,
    };

    if local_ok && domain_ok {
        Ok(email.to_string())
    } else {
        Err(ValidationError::InvalidEmail)
    }
}

/// Digits, spaces and `-+()` only, at least 8 characters and 7 digits.
pub fn validate_phone(input: &str) -> Result<String, ValidationError> {
    let phone = input.trim();
    let allowed = phone
        .chars()
        .all(|c| c.is_ascii_digit() || " -+()".contains(c));
    let digits = phone.chars().filter(|c| c.is_ascii_digit()).count();

    if allowed && phone.chars().count() >= 8 && digits >= MIN_PHONE_DIGITS {
        Ok(phone.to_string())
    } else {
        Err(ValidationError::InvalidPhone)
    }
}

/// Parses years of experience from `"3"`, `"3 years"`, `"5+ years of
/// experience"` and similar. The number must lead the answer.
pub fn parse_years_experience(input: &str) -> Result<u32, ValidationError> {
    let text = input.trim().to_lowercase();
    let digits: String = text.chars().take_while(|c| c.is_ascii_digit()).collect();
    if digits.is_empty() {
        return Err(ValidationError::InvalidExperience);
    }

    let rest = text[digits.len()..].trim_start_matches('+').trim();
    let bare = rest.is_empty() || rest == ".";
    if !bare && !(rest.starts_with("year") || rest.starts_with("yr")) {
        return Err(ValidationError::InvalidExperience);
    }

    let years = digits
        .parse::<u32>()
        .map_err(|_| ValidationError::InvalidExperience)?;
    if years > MAX_YEARS_EXPERIENCE {
        return Err(ValidationError::InvalidExperience);
    }
    Ok(years)
}

pub fn validate_non_empty(field: &'static str, input: &str) -> Result<String, ValidationError> {
    let value = collapse_whitespace(input);
    if value.is_empty() {
        return Err(ValidationError::Empty { field });
    }
    Ok(value)
}

/// Splits a declared tech stack on commas, semicolons and newlines.
/// Duplicates are dropped case-insensitively; first spelling wins.
pub fn parse_tech_stack(input: &str) -> Result<Vec<String>, ValidationError> {
    let mut stack: Vec<String> = Vec::new();
    for item in input.split(|c: char| matches!(c, ',' | ';' | '\n')) {
        let tech = collapse_whitespace(item);
        if tech.is_empty() {
            continue;
        }
        if stack.iter().any(|t| t.eq_ignore_ascii_case(&tech)) {
            continue;
        }
        stack.push(tech);
    }

    if stack.is_empty() {
        return Err(ValidationError::EmptyTechStack);
    }
    if stack.len() > MAX_TECH_STACK {
        return Err(ValidationError::TooManyTechnologies {
            count: stack.len(),
            max: MAX_TECH_STACK,
        });
    }
    Ok(stack)
}

/// True when the whole message is a conversation-ending keyword.
///
/// A keyword inside a longer message ("I would stop the deployment") is an
/// ordinary answer, never an exit.
pub fn is_exit_command(input: &str) -> bool {
    let word = input
        .trim()
        .trim_end_matches(&['.', '!', '?'][..])
        .trim()
        .to_lowercase();
    EXIT_KEYWORDS.contains(&word.as_str())
}

fn collapse_whitespace(input: &str) -> String {
    input.split_whitespace().collect::<Vec<_>>().join(" ")
}
