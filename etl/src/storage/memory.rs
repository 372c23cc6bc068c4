use super::RowSink;
use crate::models::NormalizedRow;
use common::Result;

#[derive(Debug, Default)]
pub struct MemorySink {
    rows: Vec<NormalizedRow>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn rows(&self) -> &[NormalizedRow] {
        &self.rows
    }

    pub fn drain_into(&mut self, target: &mut dyn RowSink) -> Result<()> {
        target.begin()?;
        for row in self.rows.drain(..) {
            target.write_row(&row)?;
        }
        target.flush()
    }
}

impl RowSink for MemorySink {
    fn begin(&mut self) -> Result<()> {
        Ok(())
    }

    fn write_row(&mut self, row: &NormalizedRow) -> Result<()> {
        self.rows.push(row.clone());
        Ok(())
    }

    fn flush(&mut self) -> Result<()> {
        Ok(())
    }
}
