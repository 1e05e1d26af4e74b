use crate::{error::Error, users};
use chrono::Utc;
use entity_api::user;
use log::*;
use sea_orm::DatabaseConnection;
use serde::Deserialize;
use std::collections::HashMap;

pub use entity_api::user::{find_by_id, AuthSession, Backend, Credentials};

pub const USERNAME_MAX_LENGTH: usize = 150;
pub const PASSWORD_MIN_LENGTH: usize = 8;
const MAX_SIMILARITY: f64 = 0.7;

const REQUIRED: &str = "This field is required.";
const INVALID_USERNAME: &str = "Enter a valid username. This value may contain only letters, numbers, and @/./+/-/_ characters.";
const USERNAME_TAKEN: &str = "A user with that username already exists.";
const PASSWORD_MISMATCH: &str = "The two password fields didn't match.";
const PASSWORD_TOO_SHORT: &str =
    "This password is too short. It must contain at least 8 characters.";
const PASSWORD_NUMERIC: &str = "This password is entirely numeric.";
const PASSWORD_COMMON: &str = "This password is too common.";
const PASSWORD_SIMILAR: &str = "The password is too similar to the username.";

// One lowercase password per line.
const COMMON_PASSWORDS: &str = include_str!("common_passwords.txt");

/// Fields of the sign-up form.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SignupForm {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password1: String,
    #[serde(default)]
    pub password2: String,
}

/// Validation messages per sign-up field, rendered next to the inputs.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SignupErrors {
    pub username: Vec<String>,
    pub password1: Vec<String>,
    pub password2: Vec<String>,
}

impl SignupErrors {
    pub fn is_empty(&self) -> bool {
        self.username.is_empty() && self.password1.is_empty() && self.password2.is_empty()
    }
}

#[derive(Debug)]
pub enum SignupResult {
    Created(users::Model),
    Invalid(SignupErrors),
}

/// Validates `form` and creates the account when every rule passes.
/// Validation failures are returned as `SignupResult::Invalid`, never as `Err`.
pub async fn signup(db: &DatabaseConnection, form: &SignupForm) -> Result<SignupResult, Error> {
    let mut errors = validate(form);

    // Storage is only consulted once every other rule passes.
    if errors.is_empty() && user::username_exists(db, &form.username).await? {
        errors.username.push(USERNAME_TAKEN.to_string());
    }

    if !errors.is_empty() {
        debug!("Sign-up rejected for {:?}: {errors:?}", form.username);
        return Ok(SignupResult::Invalid(errors));
    }

    match user::create(db, new_user_model(&form.username, &form.password1)).await {
        Ok(created) => {
            info!("Created user {} (id {})", created.username, created.id);
            Ok(SignupResult::Created(created))
        }
        // Lost a race against another sign-up for the same username.
        Err(e) if e.is_unique_violation() => Ok(SignupResult::Invalid(SignupErrors {
            username: vec![USERNAME_TAKEN.to_string()],
            ..Default::default()
        })),
        Err(e) => Err(e.into()),
    }
}

/// Applies every rule that needs no database access.
pub fn validate(form: &SignupForm) -> SignupErrors {
    let mut errors = SignupErrors::default();

    if form.username.is_empty() {
        errors.username.push(REQUIRED.to_string());
    } else {
        let length = form.username.chars().count();
        if length > USERNAME_MAX_LENGTH {
            errors.username.push(format!(
                "Ensure this value has at most {USERNAME_MAX_LENGTH} characters (it has {length})."
            ));
        }
        if !form.username.chars().all(is_username_char) {
            errors.username.push(INVALID_USERNAME.to_string());
        }
    }

    if form.password1.is_empty() {
        errors.password1.push(REQUIRED.to_string());
    }
    if form.password2.is_empty() {
        errors.password2.push(REQUIRED.to_string());
    }
    if form.password1.is_empty() || form.password2.is_empty() {
        return errors;
    }

    if form.password1 != form.password2 {
        errors.password2.push(PASSWORD_MISMATCH.to_string());
        return errors;
    }

    errors
        .password2
        .extend(password_policy_violations(&form.password2, &form.username));
    errors
}

pub fn is_username_char(c: char) -> bool {
    c.is_alphanumeric() || matches!(c, '@' | '.' | '+' | '-' | '_')
}

/// Messages for each password rule `password` breaks.
pub fn password_policy_violations(password: &str, username: &str) -> Vec<String> {
    let mut violations = Vec::new();

    if is_too_similar(password, username) {
        violations.push(PASSWORD_SIMILAR.to_string());
    }
    if password.chars().count() < PASSWORD_MIN_LENGTH {
        violations.push(PASSWORD_TOO_SHORT.to_string());
    }
    if is_common(password) {
        violations.push(PASSWORD_COMMON.to_string());
    }
    if password.chars().all(|c| c.is_ascii_digit()) {
        violations.push(PASSWORD_NUMERIC.to_string());
    }

    violations
}

fn is_common(password: &str) -> bool {
    let candidate = password.trim().to_lowercase();
    COMMON_PASSWORDS.lines().any(|common| common == candidate)
}

// Compares against the whole username and each of its alphanumeric runs.
// An overlong username already fails validation and is not compared.
fn is_too_similar(password: &str, username: &str) -> bool {
    if username.is_empty() || username.chars().count() > USERNAME_MAX_LENGTH {
        return false;
    }

    let password = password.to_lowercase();
    let username = username.to_lowercase();

    std::iter::once(username.as_str())
        .chain(username.split(|c: char| !c.is_alphanumeric()))
        .filter(|part| !part.is_empty())
        .any(|part| similarity(&password, part) >= MAX_SIMILARITY)
}

/// Twice the number of characters in matching blocks over the combined length.
/// `quick_ratio` bounds it from above and rules out most pairs cheaply.
fn similarity(a: &str, b: &str) -> f64 {
    if quick_ratio(a, b) < MAX_SIMILARITY {
        return 0.0;
    }

    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    let total = a.len() + b.len();
    if total == 0 {
        return 1.0;
    }

    2.0 * matching_characters(&a, &b) as f64 / total as f64
}

/// Characters covered by the longest common block and, recursively, the
/// matching blocks on either side of it.
fn matching_characters(a: &[char], b: &[char]) -> usize {
    let (i, j, size) = longest_common_block(a, b);
    if size == 0 {
        return 0;
    }

    size + matching_characters(&a[..i], &b[..j])
        + matching_characters(&a[i + size..], &b[j + size..])
}

/// Start in `a`, start in `b` and length of the longest common substring,
/// preferring the earliest start in `a`, then in `b`.
fn longest_common_block(a: &[char], b: &[char]) -> (usize, usize, usize) {
    let mut best = (0, 0, 0);
    // Length of the common suffix ending at a[i - 1] and b[j - 1].
    let mut previous = vec![0usize; b.len() + 1];

    for i in 1..=a.len() {
        let mut current = vec![0usize; b.len() + 1];
        for j in 1..=b.len() {
            if a[i - 1] == b[j - 1] {
                current[j] = previous[j - 1] + 1;
                let size = current[j];
                let (start_a, start_b) = (i - size, j - size);
                if size > best.2
                    || (size == best.2 && (start_a, start_b) < (best.0, best.1))
                {
                    best = (start_a, start_b, size);
                }
            }
        }
        previous = current;
    }

    best
}

/// Upper bound on the similarity of two strings: twice the number of shared
/// characters (with multiplicity) over their combined length.
fn quick_ratio(a: &str, b: &str) -> f64 {
    let total = a.chars().count() + b.chars().count();
    if total == 0 {
        return 1.0;
    }

    let mut available: HashMap<char, usize> = HashMap::new();
    for c in b.chars() {
        *available.entry(c).or_default() += 1;
    }

    let matches = a
        .chars()
        .filter(|c| match available.get_mut(c) {
            Some(count) if *count > 0 => {
                *count -= 1;
                true
            }
            _ => false,
        })
        .count();

    2.0 * matches as f64 / total as f64
}

/// A user model carrying only what sign-up collects; storage assigns the id.
fn new_user_model(username: &str, password: &str) -> users::Model {
    let now = Utc::now();
    users::Model {
        id: 0,
        username: username.to_owned(),
        email: String::new(),
        first_name: String::new(),
        last_name: String::new(),
        password: password.to_owned(),
        created_at: now.into(),
        updated_at: now.into(),
    }
}
