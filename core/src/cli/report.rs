use crate::history::{ComputationRecord, TIMESTAMP_FORMAT};
use std::fmt;

/// Text report formatter for a completed computation
pub struct TextReport<'a> {
    record: &'a ComputationRecord,
}

impl<'a> TextReport<'a> {
    /// Creates a new text report
    pub fn new(record: &'a ComputationRecord) -> Self {
        Self { record }
    }
}

impl<'a> fmt::Display for TextReport<'a> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let r = self.record;
        writeln!(f, "Mean Glandular Dose")?;
        writeln!(f, "===================")?;
        writeln!(f)?;
        writeln!(f, "Computed:        {}", r.timestamp.format(TIMESTAMP_FORMAT))?;
        if let Some(id) = &r.input.patient_id {
            writeln!(f, "Patient ID:      {}", id)?;
        }
        if let Some(initials) = &r.input.initials {
            writeln!(f, "Initials:        {}", initials)?;
        }
        writeln!(f, "Site:            {}", r.input.site)?;
        writeln!(f, "Target/Filter:   {}", r.input.target_filter)?;
        writeln!(f, "kV:              {}", r.input.kv)?;
        writeln!(f, "mAs:             {}", r.input.mas)?;
        writeln!(f, "Thickness:       {} cm", r.input.thickness_cm)?;
        if let Some(age) = r.input.age {
            writeln!(f, "Age:             {}", age)?;
        }
        writeln!(f)?;
        writeln!(f, "Intermediate Values")?;
        writeln!(f, "-------------------")?;
        writeln!(
            f,
            "Glandularity:    {}% (group {})",
            r.glandularity_pct, r.glandularity_group
        )?;
        writeln!(f, "s:               {}", r.s_factor)?;
        writeln!(f, "CSR:             {}", r.csr)?;
        writeln!(f, "g-Factor:        {}", r.g_factor)?;
        writeln!(f, "c-Factor:        {}", r.c_factor)?;
        writeln!(f, "Ki:              {} mGy", r.air_kerma)?;
        writeln!(f)?;
        writeln!(f, "MGD:             {} mGy", r.dose)?;

        Ok(())
    }
}
