use serde::Serialize;

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Cell {
    pub value: String,
    pub cell_type: CellType,
    /// Numeric payload for cells that came from a number in the workbook.
    pub number: Option<f64>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum CellType {
    Text,
    Number,
    Date,
    Boolean,
    Empty,
}

impl Cell {
    pub fn new_with_type(value: String, cell_type: CellType, number: Option<f64>) -> Self {
        Self {
            value,
            cell_type,
            number,
        }
    }

    pub fn text(value: impl Into<String>) -> Self {
        let value = value.into();
        if value.is_empty() {
            return Self::empty();
        }
        Self::new_with_type(value, CellType::Text, None)
    }

    pub fn number(number: f64) -> Self {
        Self::new_with_type(format_number(number), CellType::Number, Some(number))
    }

    pub fn empty() -> Self {
        Self {
            value: String::new(),
            cell_type: CellType::Empty,
            number: None,
        }
    }

    /// Blank means empty or whitespace only.
    pub fn is_blank(&self) -> bool {
        self.value.trim().is_empty()
    }

    pub fn trimmed(&self) -> &str {
        self.value.trim()
    }

    /// Numeric value of the cell, with anything unparseable coerced to zero.
    pub fn as_number(&self) -> f64 {
        if let Some(n) = self.number {
            return if n.is_finite() { n } else { 0.0 };
        }

        match self.cell_type {
            CellType::Text | CellType::Number => self
                .value
                .trim()
                .parse::<f64>()
                .ok()
                .filter(|n| n.is_finite())
                .unwrap_or(0.0),
            CellType::Boolean | CellType::Date | CellType::Empty => 0.0,
        }
    }
}

// Whole numbers print without a trailing ".0" so header and key text stays readable
pub fn format_number(f: f64) -> String {
    if f.fract() == 0.0 && f.abs() < 1e15 {
        format!("{}", f as i64)
    } else {
        f.to_string()
    }
}
