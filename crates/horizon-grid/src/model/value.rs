//! Cell values and the default value comparator.
//!
//! [`CellValue`] is the type-erased value a content provider returns for a
//! (column, element) pair. Sorting compares these values through a column's
//! [`ValueComparator`], which defaults to [`compare_cell_values`].

use std::cmp::Ordering;
use std::fmt;
use std::sync::{Arc, LazyLock};

use horizon_grid_core::logging::targets;
use icu::collator::{Collator, CollatorBorrowed};
use icu::locale::{Locale, locale};

/// Type alias for a column value comparator.
///
/// The grid only calls the comparator with two non-null values; null
/// handling (null sorts first) happens before the comparator is consulted.
pub type ValueComparator = Arc<dyn Fn(&CellValue, &CellValue) -> Ordering + Send + Sync>;

/// A value produced by a content provider for one cell.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum CellValue {
    /// No value.
    #[default]
    None,
    /// Boolean value.
    Bool(bool),
    /// Integer value.
    Int(i64),
    /// Floating point value.
    Float(f64),
    /// Text value.
    String(String),
}

impl CellValue {
    /// Returns `true` if this is `CellValue::None`.
    pub fn is_none(&self) -> bool {
        matches!(self, CellValue::None)
    }

    /// Returns `true` if this contains a value.
    pub fn is_some(&self) -> bool {
        !self.is_none()
    }

    /// Returns the text if this is a string value.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            CellValue::String(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the integer if this is an integer value.
    pub fn as_int(&self) -> Option<i64> {
        match self {
            CellValue::Int(n) => Some(*n),
            _ => None,
        }
    }

    /// Returns the value as a float for numeric variants.
    pub fn as_float(&self) -> Option<f64> {
        match self {
            CellValue::Int(n) => Some(*n as f64),
            CellValue::Float(n) => Some(*n),
            _ => None,
        }
    }

    /// Returns the boolean if this is a boolean value.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            CellValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Rank used to order values of different kinds against each other.
    fn kind_rank(&self) -> u8 {
        match self {
            CellValue::None => 0,
            CellValue::Bool(_) => 1,
            CellValue::Int(_) | CellValue::Float(_) => 2,
            CellValue::String(_) => 3,
        }
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::None => Ok(()),
            CellValue::Bool(b) => write!(f, "{b}"),
            CellValue::Int(n) => write!(f, "{n}"),
            CellValue::Float(n) => write!(f, "{n}"),
            CellValue::String(s) => f.write_str(s),
        }
    }
}

impl From<String> for CellValue {
    fn from(value: String) -> Self {
        CellValue::String(value)
    }
}

impl From<&str> for CellValue {
    fn from(value: &str) -> Self {
        CellValue::String(value.to_string())
    }
}

impl From<i64> for CellValue {
    fn from(value: i64) -> Self {
        CellValue::Int(value)
    }
}

impl From<i32> for CellValue {
    fn from(value: i32) -> Self {
        CellValue::Int(value as i64)
    }
}

impl From<f64> for CellValue {
    fn from(value: f64) -> Self {
        CellValue::Float(value)
    }
}

impl From<bool> for CellValue {
    fn from(value: bool) -> Self {
        CellValue::Bool(value)
    }
}

impl<V: Into<CellValue>> From<Option<V>> for CellValue {
    fn from(value: Option<V>) -> Self {
        value.map_or(CellValue::None, Into::into)
    }
}

/// Compares two cell values with nulls first.
///
/// Numbers compare numerically across `Int`/`Float`, text compares with
/// [`compare_text`] under the system locale, and values of different kinds
/// are ordered bool < number < text.
pub fn compare_cell_values(a: &CellValue, b: &CellValue) -> Ordering {
    compare_values(a, b, compare_text)
}

fn compare_values<F>(a: &CellValue, b: &CellValue, text: F) -> Ordering
where
    F: Fn(&str, &str) -> Ordering,
{
    match (a, b) {
        (CellValue::None, CellValue::None) => Ordering::Equal,
        (CellValue::None, _) => Ordering::Less,
        (_, CellValue::None) => Ordering::Greater,
        (CellValue::Bool(x), CellValue::Bool(y)) => x.cmp(y),
        (CellValue::Int(x), CellValue::Int(y)) => x.cmp(y),
        (CellValue::Float(x), CellValue::Float(y)) => compare_floats(*x, *y),
        (CellValue::Int(x), CellValue::Float(y)) => compare_int_float(*x, *y),
        (CellValue::Float(x), CellValue::Int(y)) => compare_int_float(*y, *x).reverse(),
        (CellValue::String(x), CellValue::String(y)) => text(x, y),
        (x, y) => x.kind_rank().cmp(&y.kind_rank()),
    }
}

/// Numeric order with `-0.0 == 0.0`; NaN sorts by its sign past the
/// infinities.
fn compare_floats(x: f64, y: f64) -> Ordering {
    x.partial_cmp(&y).unwrap_or_else(|| x.total_cmp(&y))
}

/// Exact comparison of an integer against a float, without rounding the
/// integer through `f64`.
fn compare_int_float(i: i64, f: f64) -> Ordering {
    // 2^63 as a float; every float in [-2^63, 2^63) truncates into i64.
    const LIMIT: f64 = 9_223_372_036_854_775_808.0;
    if f.is_nan() {
        return if f.is_sign_negative() {
            Ordering::Greater
        } else {
            Ordering::Less
        };
    }
    if f >= LIMIT {
        return Ordering::Less;
    }
    if f < -LIMIT {
        return Ordering::Greater;
    }
    let whole = f.trunc();
    i.cmp(&(whole as i64)).then_with(|| {
        if f > whole {
            Ordering::Less
        } else if f < whole {
            Ordering::Greater
        } else {
            Ordering::Equal
        }
    })
}

/// Locale-aware text ordering backed by ICU collation data.
///
/// Unknown or unparsable locales fall back to `en-US`. Strings the
/// collator considers equal are ordered by their raw text, so the result is
/// a total order.
pub struct TextCollator {
    locale: Locale,
    collator: Option<CollatorBorrowed<'static>>,
}

impl TextCollator {
    /// Creates a collator for the system locale.
    pub fn new() -> Self {
        let locale = sys_locale::get_locale().unwrap_or_else(|| FALLBACK_LOCALE.to_string());
        Self::with_locale(&locale)
    }

    /// Creates a collator for a BCP 47 locale identifier such as `"de-DE"`.
    pub fn with_locale(locale: &str) -> Self {
        let locale: Locale = locale.parse().unwrap_or_else(|_| locale!("en-US"));
        let collator = Collator::try_new(locale.clone().into(), Default::default())
            .or_else(|err| {
                tracing::warn!(
                    target: targets::SORT,
                    locale = %locale,
                    %err,
                    "no collation data for locale, using en-US"
                );
                Collator::try_new(locale!("en-US").into(), Default::default())
            })
            .ok();
        Self { locale, collator }
    }

    /// The locale this collator orders by.
    pub fn locale(&self) -> &Locale {
        &self.locale
    }

    /// Compares two strings.
    pub fn compare(&self, a: &str, b: &str) -> Ordering {
        let collated = match &self.collator {
            Some(collator) => collator.compare(a, b),
            None => a
                .chars()
                .flat_map(char::to_lowercase)
                .cmp(b.chars().flat_map(char::to_lowercase)),
        };
        collated.then_with(|| a.cmp(b))
    }
}

impl Default for TextCollator {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for TextCollator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TextCollator")
            .field("locale", &self.locale.to_string())
            .field("collation_data", &self.collator.is_some())
            .finish()
    }
}

static_assertions::assert_impl_all!(TextCollator: Send, Sync);

const FALLBACK_LOCALE: &str = "en-US";

static SYSTEM_COLLATOR: LazyLock<TextCollator> = LazyLock::new(TextCollator::new);

/// Compares text under the system locale's collation.
pub fn compare_text(a: &str, b: &str) -> Ordering {
    SYSTEM_COLLATOR.compare(a, b)
}

/// Returns the default comparator used by new columns.
pub fn default_comparator() -> ValueComparator {
    Arc::new(compare_cell_values)
}

/// Returns a comparator like [`compare_cell_values`] whose text ordering
/// follows `locale` instead of the system locale.
pub fn locale_comparator(locale: &str) -> ValueComparator {
    let collator = TextCollator::with_locale(locale);
    Arc::new(move |a: &CellValue, b: &CellValue| {
        compare_values(a, b, |x, y| collator.compare(x, y))
    })
}

/// Applies the null-first rule and then the column comparator.
pub(crate) fn compare_with(comparator: &ValueComparator, a: &CellValue, b: &CellValue) -> Ordering {
    match (a.is_none(), b.is_none()) {
        (true, true) => Ordering::Equal,
        (true, false) => Ordering::Less,
        (false, true) => Ordering::Greater,
        (false, false) => comparator(a, b),
    }
}
