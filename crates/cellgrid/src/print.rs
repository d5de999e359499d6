//! Rendering the printable area of a table

use crate::table::Table;
use cellgrid_core::Position;
use cellgrid_formula::CellLookup;
use std::io::{self, Write};

/// What to show for each cell
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PrintMode {
    /// Evaluated values
    #[default]
    Values,
    /// Source texts, formulas included
    Texts,
}

/// Options for printing a table
#[derive(Debug, Clone)]
pub struct PrintOptions {
    /// Separator written between the cells of a row (default: tab)
    pub delimiter: char,
    /// Values or texts (default: values)
    pub mode: PrintMode,
}

impl Default for PrintOptions {
    fn default() -> Self {
        Self {
            delimiter: '\t',
            mode: PrintMode::Values,
        }
    }
}

impl PrintOptions {
    /// Set the delimiter
    pub fn with_delimiter(mut self, delimiter: char) -> Self {
        self.delimiter = delimiter;
        self
    }

    /// Set the mode
    pub fn with_mode(mut self, mode: PrintMode) -> Self {
        self.mode = mode;
        self
    }
}

impl Table {
    /// Write the values of the printable area, one line per row, cells separated by tabs
    pub fn print_values<W: Write>(&self, out: &mut W) -> io::Result<()> {
        self.print_with(out, &PrintOptions::default())
    }

    /// Write the texts of the printable area, one line per row, cells separated by tabs
    pub fn print_texts<W: Write>(&self, out: &mut W) -> io::Result<()> {
        self.print_with(out, &PrintOptions::default().with_mode(PrintMode::Texts))
    }

    /// Write the printable area with custom options
    ///
    /// Every row of the area produces a line, empty rows included. Absent and empty cells
    /// leave their slot blank.
    pub fn print_with<W: Write>(&self, out: &mut W, options: &PrintOptions) -> io::Result<()> {
        let size = self.printable_size();
        let mut delimiter = [0u8; 4];
        let delimiter = options.delimiter.encode_utf8(&mut delimiter).as_bytes();

        for row in 0..size.rows {
            for col in 0..size.cols {
                if col > 0 {
                    out.write_all(delimiter)?;
                }
                let pos = Position::new(row, col);
                match options.mode {
                    PrintMode::Values => {
                        write!(out, "{}", self.value_at(pos).unwrap_or_default())?
                    }
                    PrintMode::Texts => out.write_all(self.text_at(pos).as_bytes())?,
                }
            }
            out.write_all(b"\n")?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn render(table: &Table, options: &PrintOptions) -> String {
        let mut out = Vec::new();
        table.print_with(&mut out, options).unwrap();
        String::from_utf8(out).unwrap()
    }

    fn sample() -> Table {
        let mut table = Table::new();
        table.set_cell(Position::from_a1("A1"), "'=x").unwrap();
        table.set_cell(Position::from_a1("B2"), "=C1/0").unwrap();
        table.set_cell(Position::from_a1("C3"), "=1.5*2").unwrap();
        table
    }

    #[test]
    fn test_print_empty_table() {
        let table = Table::new();
        assert_eq!(render(&table, &PrintOptions::default()), "");
    }

    #[test]
    fn test_print_values() {
        let table = sample();
        let mut out = Vec::new();
        table.print_values(&mut out).unwrap();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "=x\t\t\n\t#ARITHM!\t\n\t\t3\n"
        );
    }

    #[test]
    fn test_print_texts() {
        let table = sample();
        let mut out = Vec::new();
        table.print_texts(&mut out).unwrap();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "'=x\t\t\n\t=C1/0\t\n\t\t=1.5*2\n"
        );
    }

    #[test]
    fn test_print_custom_delimiter() {
        let mut table = Table::new();
        table.set_cell(Position::from_a1("A1"), "1").unwrap();
        table.set_cell(Position::from_a1("B1"), "=A1+1").unwrap();

        let options = PrintOptions::default().with_delimiter(',');
        assert_eq!(render(&table, &options), "1,2\n");

        let options = options.with_mode(PrintMode::Texts);
        assert_eq!(render(&table, &options), "1,=A1+1\n");
    }

    #[test]
    fn test_placeholders_print_blank() {
        let mut table = Table::new();
        table.set_cell(Position::from_a1("B1"), "=A1").unwrap();
        assert_eq!(render(&table, &PrintOptions::default()), "\t0\n");
    }

    #[test]
    fn test_cleared_cells_print_blank() {
        let mut table = Table::new();
        table.set_cell(Position::from_a1("A1"), "x").unwrap();
        table.set_cell(Position::from_a1("B1"), "=A2").unwrap();
        table.set_cell(Position::from_a1("A2"), "5").unwrap();
        table.clear_cell(Position::from_a1("A2")).unwrap();

        assert_eq!(render(&table, &PrintOptions::default()), "x\t0\n");
        let texts = PrintOptions::default().with_mode(PrintMode::Texts);
        assert_eq!(render(&table, &texts), "x\t=A2\n");
    }
}
