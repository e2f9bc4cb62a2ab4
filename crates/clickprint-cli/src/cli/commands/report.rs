//! Per-file table printed after a batch.

use clickprint_core::BatchReport;

pub fn print_report(report: &BatchReport) {
    for o in report.outcomes() {
        let status = match (&o.error, o.uploaded) {
            (Some(e), _) => e.kind(),
            (None, true) => "uploaded",
            (None, false) => "stored",
        };
        let hash = o.hash.as_ref().map(|h| h.as_str()).unwrap_or("-");
        println!("{:>3}  {:<10} {}  {}", o.index, status, hash, o.file.display_name);
        if let Some(e) = &o.error {
            println!("     {}", e);
        } else if o.probe_fell_back {
            println!("     (existence check failed; uploaded anyway)");
        }
    }
    println!("{}", report.summary());
}
