//! A single life expectancy table: one row per birth year, one column per age

/// Oldest age tabulated (and the projection horizon)
pub const MAX_AGE: u32 = 95;

/// Number of age columns per row (ages 0..=95)
pub const AGE_COLUMNS: usize = MAX_AGE as usize + 1;

/// Earliest birth year covered by the published tables
pub const FIRST_BIRTH_YEAR: i32 = 1876;

/// Latest birth year covered by the published tables
pub const LAST_BIRTH_YEAR: i32 = 2016;

/// Expected age at death by birth year and attained age
///
/// Rows are stored contiguously from `first_birth_year`, so a lookup is an
/// index offset rather than a search.
#[derive(Debug, Clone, PartialEq)]
pub struct LifeExpectancyTable {
    first_birth_year: i32,
    rows: Vec<[f64; AGE_COLUMNS]>,
}

impl LifeExpectancyTable {
    /// Create a table whose first row belongs to `first_birth_year`
    pub fn new(first_birth_year: i32, rows: Vec<[f64; AGE_COLUMNS]>) -> Self {
        Self { first_birth_year, rows }
    }

    pub fn first_birth_year(&self) -> i32 {
        self.first_birth_year
    }

    /// Last birth year with a row, or `None` for an empty table
    pub fn last_birth_year(&self) -> Option<i32> {
        if self.rows.is_empty() {
            None
        } else {
            Some(self.first_birth_year + self.rows.len() as i32 - 1)
        }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Whether a row exists for `birth_year`
    pub fn covers(&self, birth_year: i32) -> bool {
        self.row(birth_year).is_some()
    }

    /// Tabulated value at (birth_year, age), if both are within the table
    pub fn value(&self, birth_year: i32, age: u32) -> Option<f64> {
        self.row(birth_year)
            .and_then(|row| row.get(age as usize))
            .copied()
    }

    fn row(&self, birth_year: i32) -> Option<&[f64; AGE_COLUMNS]> {
        let offset = birth_year.checked_sub(self.first_birth_year)?;
        if offset < 0 {
            return None;
        }
        self.rows.get(offset as usize)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_row_table() -> LifeExpectancyTable {
        let mut first = [0.0; AGE_COLUMNS];
        let mut second = [0.0; AGE_COLUMNS];
        for age in 0..AGE_COLUMNS {
            first[age] = 70.0 + age as f64 * 0.3;
            second[age] = 71.0 + age as f64 * 0.3;
        }
        LifeExpectancyTable::new(1950, vec![first, second])
    }

    #[test]
    fn test_value_by_birth_year_and_age() {
        let table = two_row_table();
        assert_eq!(table.value(1950, 0), Some(70.0));
        assert_eq!(table.value(1951, 10), Some(74.0));
        assert_eq!(table.last_birth_year(), Some(1951));
    }

    #[test]
    fn test_out_of_range_rows_and_columns() {
        let table = two_row_table();
        assert_eq!(table.value(1949, 10), None);
        assert_eq!(table.value(1952, 10), None);
        assert_eq!(table.value(1950, 96), None);
        assert!(table.covers(1951));
        assert!(!table.covers(i32::MIN));
    }

    #[test]
    fn test_empty_table() {
        let table = LifeExpectancyTable::new(FIRST_BIRTH_YEAR, Vec::new());
        assert!(table.is_empty());
        assert_eq!(table.last_birth_year(), None);
        assert_eq!(table.value(FIRST_BIRTH_YEAR, 0), None);
    }
}
