//! `patti resolve <text>` – show how a link cell is interpreted.

use patti_core::cell::{self, CellPayload};
use patti_core::pipeline::{plan, Strategy};

pub fn run_resolve(text: &str, formula: bool) {
    let payload = if formula {
        CellPayload {
            formula: Some(text.to_string()),
            ..CellPayload::default()
        }
    } else {
        CellPayload::text(text)
    };
    let link = cell::interpret(&payload);

    println!("candidate: {}", link.candidate.as_deref().unwrap_or("-"));
    println!("kind:      {}", link.descriptor.kind());
    println!("link:      {}", link.descriptor);
    let steps = plan(&link, true);
    if steps.is_empty() {
        println!("plan:      (none, row would be skipped)");
    } else {
        let labels: Vec<String> = steps.iter().map(Strategy::to_string).collect();
        println!("plan:      {}", labels.join(" → "));
    }
}
