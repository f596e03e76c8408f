//! Progress reporting using indicatif progress bars

use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use lpcflasher_core::bus::TurnaroundWarning;
use lpcflasher_core::flash::Progress;

/// Create a progress bar with custom phase message
fn create_progress_bar_with_phase(
    total: u64,
    phase: &str,
) -> Result<ProgressBar, Box<dyn std::error::Error>> {
    let pb = ProgressBar::new(total);
    pb.set_style(
        ProgressStyle::default_bar()
            .template(&format!(
                "{{spinner:.green}} [{{elapsed_precise}}] [{{bar:40.cyan/blue}}] {{bytes}}/{{total_bytes}} ({{bytes_per_sec}}, {{eta}}) {}",
                phase
            ))?
            .progress_chars("#>-"),
    );
    Ok(pb)
}

/// Progress reporter using indicatif progress bars
pub struct IndicatifProgress {
    multi: MultiProgress,
    current_bar: Option<ProgressBar>,
    read_phase: &'static str,
    warnings: usize,
}

impl IndicatifProgress {
    /// Reporter for reads and writes
    pub fn new() -> Self {
        Self::with_read_phase("Reading")
    }

    /// Reporter for a verify pass; its read bars say "Verifying"
    pub fn verifying() -> Self {
        Self::with_read_phase("Verifying")
    }

    fn with_read_phase(read_phase: &'static str) -> Self {
        Self {
            multi: MultiProgress::new(),
            current_bar: None,
            read_phase,
            warnings: 0,
        }
    }

    fn create_bar(&mut self, total: u64, phase: &'static str) {
        self.finish();
        let pb = self.multi.add(
            create_progress_bar_with_phase(total, phase)
                .unwrap_or_else(|_| ProgressBar::new(total)),
        );
        self.current_bar = Some(pb);
    }

    fn set_position(&self, pos: usize) {
        if let Some(pb) = &self.current_bar {
            pb.set_position(pos as u64);
        }
    }

    /// Finish the current bar, if any
    pub fn finish(&mut self) {
        if let Some(pb) = self.current_bar.take() {
            pb.finish();
        }
    }
}

impl Default for IndicatifProgress {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for IndicatifProgress {
    fn drop(&mut self) {
        self.finish();
    }
}

impl Progress for IndicatifProgress {
    fn reading(&mut self, total_bytes: usize) {
        self.create_bar(total_bytes as u64, self.read_phase);
    }

    fn read_progress(&mut self, bytes_read: usize) {
        self.set_position(bytes_read);
    }

    fn writing(&mut self, total_bytes: usize) {
        self.create_bar(total_bytes as u64, "Writing");
    }

    fn write_progress(&mut self, bytes_written: usize) {
        self.set_position(bytes_written);
    }

    fn turnaround_warning(&mut self, warning: &TurnaroundWarning) {
        self.warnings += 1;
        // Only the first few go to the terminal; the log gets all of them
        if self.warnings <= 8 {
            let line = format!(
                "warning: turnaround nibble 0x{:X} after block at 0x{:08X}",
                warning.nibble, warning.addr
            );
            match &self.current_bar {
                Some(pb) => pb.println(line),
                None => eprintln!("{}", line),
            }
        }
    }
}
