//! Order form state: the candidate list of `(meal, quantity)` entries.
//!
//! An [`OrderDraft`] holds raw, possibly invalid input exactly as the user
//! entered it. The controls (add, remove, plus, minus) edit the draft in
//! place; [`OrderDraft::validate`] turns it into [`NewOrderLine`]s or a list
//! of per-field errors. Nothing reaches the store unless validation passes.

use core::fmt;
use core::str::FromStr;

use serde::Serialize;

use crate::order::NewOrderLine;
use crate::types::{MealId, Quantity, QuantityError};

/// Placeholder meal ID of an entry whose meal has not been picked yet.
pub const UNSELECTED_MEAL: i32 = 0;

/// One row of the order form.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DraftEntry {
    /// Selected meal, or [`UNSELECTED_MEAL`].
    pub meal_id: i32,
    /// Requested quantity, unvalidated.
    pub quantity: i64,
}

impl DraftEntry {
    /// A fresh row: no meal picked, quantity 1.
    #[must_use]
    pub const fn empty() -> Self {
        Self {
            meal_id: UNSELECTED_MEAL,
            quantity: 1,
        }
    }
}

impl Default for DraftEntry {
    fn default() -> Self {
        Self::empty()
    }
}

/// A control action on the form.
///
/// Encoded as `add`, `remove:{i}`, `inc:{i}` or `dec:{i}` so it can travel as
/// a submit button value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DraftAction {
    /// Append an empty entry.
    Add,
    /// Remove the entry at a position.
    Remove(usize),
    /// Add one to the quantity of an entry.
    Increment(usize),
    /// Subtract one from the quantity of an entry, stopping at 1.
    Decrement(usize),
}

/// A form action string could not be parsed.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown form action: {0}")]
pub struct UnknownAction(pub String);

impl FromStr for DraftAction {
    type Err = UnknownAction;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s == "add" {
            return Ok(Self::Add);
        }

        let unknown = || UnknownAction(s.to_owned());
        let (verb, index) = s.split_once(':').ok_or_else(unknown)?;
        let index = index.parse::<usize>().map_err(|_| unknown())?;

        match verb {
            "remove" => Ok(Self::Remove(index)),
            "inc" => Ok(Self::Increment(index)),
            "dec" => Ok(Self::Decrement(index)),
            _ => Err(unknown()),
        }
    }
}

impl fmt::Display for DraftAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Add => write!(f, "add"),
            Self::Remove(i) => write!(f, "remove:{i}"),
            Self::Increment(i) => write!(f, "inc:{i}"),
            Self::Decrement(i) => write!(f, "dec:{i}"),
        }
    }
}

/// The in-progress order form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderDraft {
    entries: Vec<DraftEntry>,
}

impl Default for OrderDraft {
    fn default() -> Self {
        Self::new()
    }
}

impl OrderDraft {
    /// A draft with a single empty entry, the state of a freshly opened form.
    #[must_use]
    pub fn new() -> Self {
        Self {
            entries: vec![DraftEntry::empty()],
        }
    }

    /// Rebuild a draft from submitted rows. The list may be empty.
    #[must_use]
    pub const fn from_entries(entries: Vec<DraftEntry>) -> Self {
        Self { entries }
    }

    /// Current rows.
    #[must_use]
    pub fn entries(&self) -> &[DraftEntry] {
        &self.entries
    }

    /// Whether the draft has no rows at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Apply a control action. Actions on positions that do not exist are
    /// ignored; the return value reports whether the draft changed.
    pub fn apply(&mut self, action: DraftAction) -> bool {
        match action {
            DraftAction::Add => {
                self.entries.push(DraftEntry::empty());
                true
            }
            DraftAction::Remove(index) => {
                if index < self.entries.len() {
                    self.entries.remove(index);
                    true
                } else {
                    false
                }
            }
            DraftAction::Increment(index) => self.step_quantity(index, true),
            DraftAction::Decrement(index) => self.step_quantity(index, false),
        }
    }

    fn step_quantity(&mut self, index: usize, up: bool) -> bool {
        let Some(entry) = self.entries.get_mut(index) else {
            return false;
        };

        // Garbage input snaps back to the minimum rather than failing.
        let next = match Quantity::new(entry.quantity) {
            Ok(current) if up => current.increment(),
            Ok(current) => current.decrement(),
            Err(_) => Quantity::MIN,
        };
        let next = i64::from(next.get());
        let changed = next != entry.quantity;
        entry.quantity = next;
        changed
    }

    /// Check every rule and collect all violations.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationErrors`] with one [`FieldError`] per offending
    /// field, or a single list-level error if there are no entries.
    pub fn validate(&self) -> Result<Vec<NewOrderLine>, ValidationErrors> {
        if self.entries.is_empty() {
            return Err(ValidationErrors(vec![FieldError {
                field: Field::Meals,
                kind: FieldErrorKind::AtLeastOneRequired,
            }]));
        }

        let mut lines = Vec::with_capacity(self.entries.len());
        let mut errors = Vec::new();

        for (index, entry) in self.entries.iter().enumerate() {
            let meal_id = if entry.meal_id >= 1 {
                Some(MealId::new(entry.meal_id))
            } else {
                errors.push(FieldError {
                    field: Field::MealId(index),
                    kind: FieldErrorKind::MealRequired,
                });
                None
            };

            let quantity = match Quantity::new(entry.quantity) {
                Ok(quantity) => Some(quantity),
                Err(QuantityError::BelowMinimum(_)) => {
                    errors.push(FieldError {
                        field: Field::Quantity(index),
                        kind: FieldErrorKind::QuantityTooLow,
                    });
                    None
                }
                Err(QuantityError::TooLarge(_)) => {
                    errors.push(FieldError {
                        field: Field::Quantity(index),
                        kind: FieldErrorKind::QuantityTooLarge,
                    });
                    None
                }
            };

            if let (Some(meal_id), Some(quantity)) = (meal_id, quantity) {
                lines.push(NewOrderLine { meal_id, quantity });
            }
        }

        if errors.is_empty() {
            Ok(lines)
        } else {
            Err(ValidationErrors(errors))
        }
    }
}

/// Location of a validation error in the submitted form.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    /// The list as a whole.
    Meals,
    /// The meal picker of entry `i`.
    MealId(usize),
    /// The quantity of entry `i`.
    Quantity(usize),
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Meals => write!(f, "meals"),
            Self::MealId(i) => write!(f, "meals[{i}].mealId"),
            Self::Quantity(i) => write!(f, "meals[{i}].quantity"),
        }
    }
}

impl Serialize for Field {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// What rule a field broke.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldErrorKind {
    /// The list has no entries.
    AtLeastOneRequired,
    /// An entry still has the placeholder meal.
    MealRequired,
    /// An entry's quantity is below 1.
    QuantityTooLow,
    /// An entry's quantity does not fit the store.
    QuantityTooLarge,
}

impl FieldErrorKind {
    /// Terse rule description, as used in API responses.
    #[must_use]
    pub const fn message(self) -> &'static str {
        match self {
            Self::AtLeastOneRequired => "at least one required",
            Self::MealRequired => "required",
            Self::QuantityTooLow => "must be ≥ 1",
            Self::QuantityTooLarge => "too large",
        }
    }

    /// Sentence shown next to the field in the form.
    #[must_use]
    pub const fn hint(self) -> &'static str {
        match self {
            Self::AtLeastOneRequired => "Please add at least one meal",
            Self::MealRequired => "Please select a meal",
            Self::QuantityTooLow => "Quantity must be at least 1",
            Self::QuantityTooLarge => "Quantity is too large",
        }
    }
}

/// A single rule violation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FieldError {
    /// Offending field.
    pub field: Field,
    /// Broken rule.
    #[serde(rename = "message", serialize_with = "serialize_kind")]
    pub kind: FieldErrorKind,
}

fn serialize_kind<S: serde::Serializer>(kind: &FieldErrorKind, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(kind.message())
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.kind.message())
    }
}

/// All violations found in one submission.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq, Serialize)]
#[error("{}", format_errors(.0))]
pub struct ValidationErrors(pub Vec<FieldError>);

fn format_errors(errors: &[FieldError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

impl ValidationErrors {
    /// All violations.
    #[must_use]
    pub fn errors(&self) -> &[FieldError] {
        &self.0
    }

    /// The error for the whole list, if any.
    #[must_use]
    pub fn list_error(&self) -> Option<FieldError> {
        self.find(Field::Meals)
    }

    /// The error for the meal picker of entry `index`, if any.
    #[must_use]
    pub fn meal_error(&self, index: usize) -> Option<FieldError> {
        self.find(Field::MealId(index))
    }

    /// The error for the quantity of entry `index`, if any.
    #[must_use]
    pub fn quantity_error(&self, index: usize) -> Option<FieldError> {
        self.find(Field::Quantity(index))
    }

    fn find(&self, field: Field) -> Option<FieldError> {
        self.0.iter().copied().find(|e| e.field == field)
    }
}
