use crate::error::Result;
use crate::pilot::Pilot;
use crate::tub::TubReader;
use crate::types::AugmentedRecord;

/// Tub records by position, each paired with a fresh pilot prediction.
/// Nothing is cached: every `get` reads the record and runs the pilot once.
pub struct RecordView {
    reader: TubReader,
    pilot: Box<dyn Pilot>,
}

impl RecordView {
    pub fn new(reader: TubReader, pilot: Box<dyn Pilot>) -> Self {
        Self { reader, pilot }
    }

    pub fn count(&self) -> usize {
        self.reader.count()
    }

    pub fn pilot_name(&self) -> String {
        self.pilot.name()
    }

    pub fn get(&mut self, position: usize) -> Result<AugmentedRecord> {
        let record_id = self.reader.id_at(position)?;
        let record = self.reader.tub().get_record(record_id)?;
        let pilot = self.pilot.run(record.camera_image()?)?;
        tracing::debug!(position, record_id, angle = pilot.angle, throttle = pilot.throttle, "pilot prediction");

        Ok(AugmentedRecord {
            record,
            record_id,
            position,
            pilot,
        })
    }
}
