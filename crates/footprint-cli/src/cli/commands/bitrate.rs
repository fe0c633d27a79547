use footprint_core::bitrate::{analyze_folder, FfprobeBitrate};

use super::report_error;
use crate::cli::args::BitrateArgs;
use crate::exit_codes::SUCCESS;

pub async fn run(args: BitrateArgs) -> anyhow::Result<i32> {
    let probe = FfprobeBitrate::with_program(&args.ffprobe);
    match analyze_folder(&probe, &args.folder).await {
        Ok(report) => {
            print!("{}", report.render());
            Ok(SUCCESS)
        }
        Err(e) => Ok(report_error(&e)),
    }
}
