//! Field Validator
//!
//! A single traversal collects two independent error lists: single-field
//! constraint failures and cross-field predicate failures. Cross-field
//! failures are only reported when no single-field failure exists anywhere
//! in the object tree, so a report never mixes the two.
//!
//! Missing and mistyped fields are found during resolution rather than by the
//! traversal. [`recover`] keeps resolving past them so that they are reported
//! together with the constraint failures of their siblings.

use std::fmt::Display;

use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use crate::error::{ConfigError, FieldError, Result, MISSING, REQUIRED};
use crate::tagged::{self, join_path};

/// Constraint checking for a configuration value.
pub trait Validate {
    fn validate(&self, v: &mut Validator);
}

impl<T: Validate> Validate for Option<T> {
    fn validate(&self, v: &mut Validator) {
        if let Some(inner) = self {
            inner.validate(v);
        }
    }
}

impl<T: Validate> Validate for Box<T> {
    fn validate(&self, v: &mut Validator) {
        (**self).validate(v);
    }
}

/// A scalar that may be absent. Bound checks skip absent values.
pub trait Given<T> {
    fn given(self) -> Option<T>;
}

macro_rules! given {
    ($($t:ty),*) => {
        $(
            impl Given<$t> for $t {
                fn given(self) -> Option<$t> {
                    Some(self)
                }
            }

            impl Given<$t> for Option<$t> {
                fn given(self) -> Option<$t> {
                    self
                }
            }
        )*
    };
}

given!(f64, u8, u16, u32, u64, usize, i32, i64);

#[derive(Debug, Default)]
pub struct Validator {
    path: Vec<String>,
    field_errors: Vec<FieldError>,
    cross_errors: Vec<FieldError>,
}

impl Validator {
    pub fn new() -> Self {
        Self::default()
    }

    fn path_of(&self, field: &str) -> String {
        let mut segments: Vec<&str> = self.path.iter().map(String::as_str).collect();
        segments.push(field);
        join_path(&segments)
    }

    /// Validate a nested value under `name`.
    pub fn nested<T: Validate + ?Sized>(&mut self, name: &str, child: &T) {
        self.path.push(name.to_string());
        child.validate(self);
        self.path.pop();
    }

    /// Validate every element of a list under `name[i]`.
    pub fn each<T: Validate>(&mut self, name: &str, items: &[T]) {
        self.path.push(name.to_string());
        for (i, item) in items.iter().enumerate() {
            self.nested(&format!("[{i}]"), item);
        }
        self.path.pop();
    }

    /// Record a single-field failure unless `ok` holds.
    pub fn check(&mut self, ok: bool, field: &str, value: impl Display, constraint: &str) {
        if !ok {
            let path = self.path_of(field);
            self.field_errors
                .push(FieldError::new(path, value.to_string(), constraint));
        }
    }

    /// Record a cross-field failure unless `ok` holds.
    pub fn rule(&mut self, ok: bool, fields: &str, message: &str) {
        if !ok {
            let path = self.path_of(fields);
            self.cross_errors
                .push(FieldError::new(path, "<combination>", message));
        }
    }

    pub fn range<T>(&mut self, field: &str, value: impl Given<T>, lo: T, hi: T)
    where
        T: PartialOrd + Display + Copy,
    {
        if let Some(x) = value.given() {
            self.check(
                lo <= x && x <= hi,
                field,
                x,
                &format!("must be between {lo} and {hi}"),
            );
        }
    }

    pub fn min<T>(&mut self, field: &str, value: impl Given<T>, lo: T)
    where
        T: PartialOrd + Display + Copy,
    {
        if let Some(x) = value.given() {
            self.check(x >= lo, field, x, &format!("must be >= {lo}"));
        }
    }

    pub fn positive<T>(&mut self, field: &str, value: impl Given<T>)
    where
        T: PartialOrd + Display + Copy + Default,
    {
        if let Some(x) = value.given() {
            self.check(x > T::default(), field, x, "must be > 0");
        }
    }

    pub fn max_len<S: AsRef<str>>(&mut self, field: &str, value: Option<S>, max: usize) {
        if let Some(s) = value {
            let s = s.as_ref();
            self.check(
                s.chars().count() <= max,
                field,
                format!("'{s}'"),
                &format!("must be at most {max} characters"),
            );
        }
    }

    pub fn one_of<T>(&mut self, field: &str, value: impl Given<T>, allowed: &[T])
    where
        T: PartialEq + Display + Copy,
    {
        if let Some(x) = value.given() {
            let listed = allowed
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join(", ");
            self.check(
                allowed.contains(&x),
                field,
                x,
                &format!("must be one of [{listed}]"),
            );
        }
    }

    /// Cross-field: `dependent` may only be given together with `anchor`.
    pub fn requires(&mut self, dependent: (&str, bool), anchor: (&str, bool)) {
        if dependent.1 && !anchor.1 {
            let msg = format!("'{}' requires '{}'", dependent.0, anchor.0);
            self.rule(false, dependent.0, &msg);
        }
    }

    /// Finish the traversal, field errors taking priority over cross-field ones.
    pub fn finish(self) -> Result<()> {
        self.finish_after(Vec::new(), &[])
    }

    /// Finish after resolution already failed `earlier` fields. Failures at
    /// or below a stand-in path are not input errors and are dropped.
    pub fn finish_after(self, earlier: Vec<FieldError>, stand_ins: &[String]) -> Result<()> {
        let mut field_errors = earlier;
        field_errors.extend(
            self.field_errors
                .into_iter()
                .filter(|e| !stand_ins.iter().any(|s| within(&e.path, s))),
        );
        if !field_errors.is_empty() {
            Err(ConfigError::Validation(field_errors))
        } else if !self.cross_errors.is_empty() {
            Err(ConfigError::Validation(self.cross_errors))
        } else {
            Ok(())
        }
    }
}

/// Run both validation passes over `value`.
pub fn validate<T: Validate + ?Sized>(value: &T) -> Result<()> {
    let mut v = Validator::new();
    value.validate(&mut v);
    v.finish()
}

/// Resolve and validate a value from raw key-value input.
pub fn build<T: DeserializeOwned + Validate>(raw: Value) -> Result<T> {
    let recovered = recover::<T>(raw)?;
    let mut v = Validator::new();
    recovered.value.validate(&mut v);
    v.finish_after(recovered.errors, &recovered.stand_ins)?;
    Ok(recovered.value)
}

// ============================================================================
// Recovering resolution
// ============================================================================
//
// serde stops at the first missing or mistyped field. The failing value is
// recorded, replaced by a stand-in and resolution starts over, until the
// input resolves. Unknown variants and unexpected fields in the input are
// returned as they are: without the right variant there is no schema to keep
// checking against.

const MAX_ATTEMPTS: usize = 512;

/// Stand-ins tried in turn for a missing or mistyped value
fn stand_in(attempt: usize) -> Option<Value> {
    match attempt {
        0 => Some(Value::Null),
        1 => Some(Value::from(0)),
        2 => Some(Value::from("")),
        3 => Some(Value::Bool(false)),
        4 => Some(Value::Array(Vec::new())),
        5 => Some(Value::Object(Map::new())),
        _ => None,
    }
}

/// A resolved value and the field failures resolution got past
#[derive(Debug)]
pub struct Recovered<T> {
    pub value: T,
    pub errors: Vec<FieldError>,
    /// Paths holding stand-ins rather than input
    pub stand_ins: Vec<String>,
}

enum Failure {
    Missing,
    Mistyped(String),
    Variant(&'static str),
}

fn failure(err: &ConfigError) -> Option<(String, Failure)> {
    match err {
        ConfigError::Validation(errors) => match errors.as_slice() {
            [e] if e.value == MISSING => Some((e.path.clone(), Failure::Missing)),
            _ => None,
        },
        ConfigError::Invalid { path, message } if !path.is_empty() => {
            Some((path.clone(), Failure::Mistyped(message.clone())))
        }
        ConfigError::UnknownVariant { path, expected, .. }
        | ConfigError::MissingDiscriminator { path, expected } => expected
            .first()
            .map(|tag| (path.clone(), Failure::Variant(tag))),
        _ => None,
    }
}

/// `path` is `base` or lies below it
fn within(path: &str, base: &str) -> bool {
    path.strip_prefix(base)
        .is_some_and(|rest| rest.is_empty() || rest.starts_with('.') || rest.starts_with('['))
}

enum Step {
    Key(String),
    Index(usize),
}

fn steps(path: &str) -> Vec<Step> {
    let mut out = Vec::new();
    for part in path.split('.') {
        let (key, mut rest) = part.split_at(part.find('[').unwrap_or(part.len()));
        if !key.is_empty() {
            out.push(Step::Key(key.to_string()));
        }
        while let Some((index, tail)) = rest.strip_prefix('[').and_then(|r| r.split_once(']')) {
            if let Ok(i) = index.parse() {
                out.push(Step::Index(i));
            }
            rest = tail;
        }
    }
    out
}

fn lookup<'a>(root: &'a Value, path: &str) -> Option<&'a Value> {
    steps(path).iter().try_fold(root, |node, step| match step {
        Step::Key(k) => node.get(k.as_str()),
        Step::Index(i) => node.get(*i),
    })
}

fn place(root: &mut Value, path: &str, value: Value) -> Option<()> {
    let steps = steps(path);
    let (last, parents) = steps.split_last()?;
    let mut node = root;
    for step in parents {
        node = match step {
            Step::Key(k) => node.get_mut(k.as_str())?,
            Step::Index(i) => node.get_mut(*i)?,
        };
    }
    match (last, node) {
        (Step::Key(k), Value::Object(map)) => {
            map.insert(k.clone(), value);
        }
        (Step::Index(i), Value::Array(items)) => *items.get_mut(*i)? = value,
        _ => return None,
    }
    Some(())
}

fn shown(value: Option<&Value>) -> String {
    match value {
        Some(Value::String(s)) => format!("'{s}'"),
        Some(other) => other.to_string(),
        None => MISSING.to_string(),
    }
}

/// Resolve `raw`, getting past every missing or mistyped field.
///
/// Fails with the collected [`ConfigError::Validation`] only when no stand-in
/// can be found for some field; otherwise the caller decides what to do with
/// [`Recovered::errors`].
pub fn recover<T: DeserializeOwned>(raw: Value) -> Result<Recovered<T>> {
    let mut raw = raw;
    let mut errors: Vec<FieldError> = Vec::new();
    let mut stand_ins: Vec<(String, usize)> = Vec::new();

    for _ in 0..MAX_ATTEMPTS {
        let err = match tagged::from_value::<T>(raw.clone()) {
            Ok(value) => {
                return Ok(Recovered {
                    value,
                    errors,
                    stand_ins: stand_ins.into_iter().map(|(path, _)| path).collect(),
                })
            }
            Err(err) => err,
        };
        let Some((path, failed)) = failure(&err) else {
            return Err(err);
        };
        let exact = stand_ins.iter().position(|(p, _)| *p == path);
        let covered = stand_ins.iter().any(|(p, _)| within(&path, p));

        let replacement = match failed {
            Failure::Variant(tag) if covered => match lookup(&raw, &path) {
                Some(Value::Object(body)) => {
                    let mut body = body.clone();
                    body.insert(tagged::TAG_KEY.to_string(), Value::from(tag));
                    Some(Value::Object(body))
                }
                _ => Some(Value::from(tag)),
            },
            Failure::Variant(_) => return Err(err),
            _ if exact.is_some() => exact.and_then(|k| {
                stand_ins[k].1 += 1;
                stand_in(stand_ins[k].1)
            }),
            Failure::Missing => {
                if !covered {
                    errors.push(FieldError::new(path.clone(), MISSING, REQUIRED));
                }
                stand_ins.push((path.clone(), 0));
                stand_in(0)
            }
            Failure::Mistyped(message) => {
                if !covered {
                    errors.push(FieldError::new(path.clone(), shown(lookup(&raw, &path)), message));
                }
                stand_ins.push((path.clone(), 0));
                stand_in(0)
            }
        };

        let placed = replacement.and_then(|value| place(&mut raw, &path, value));
        if placed.is_none() {
            break;
        }
    }

    if errors.is_empty() {
        tagged::from_value::<T>(raw).map(|value| Recovered {
            value,
            errors: Vec::new(),
            stand_ins: Vec::new(),
        })
    } else {
        Err(ConfigError::Validation(errors))
    }
}
