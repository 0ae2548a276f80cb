//! Pre-authored diagnoses served when no vision model API key is configured.
//!
//! Keeps the service runnable and testable without the external model. The
//! same job id always maps to the same fixture so retries are stable.

use std::hash::{DefaultHasher, Hash, Hasher};

use crate::models::diagnosis::{DiagnosisResult, Difficulty, PartItem, RepairStep, ToolItem};

/// Select a fixture diagnosis keyed by a hash of the job id.
pub fn pick(job_id: &str) -> DiagnosisResult {
    let mut hasher = DefaultHasher::new();
    job_id.hash(&mut hasher);
    let mut all = all();
    // The modulo keeps the index in bounds.
    let index = (hasher.finish() % all.len() as u64) as usize;
    all.swap_remove(index)
}

/// All fixture diagnoses, spanning distinct repair categories.
pub fn all() -> Vec<DiagnosisResult> {
    vec![cabinet_hinge(), leaky_faucet(), sticking_drawer()]
}

fn tool(name: &str, quantity: i32, must_have: bool) -> ToolItem {
    ToolItem {
        name: name.to_string(),
        quantity,
        must_have,
    }
}

fn part(name: &str, variants: &[&str], notes: &str) -> PartItem {
    PartItem {
        name: name.to_string(),
        variants: variants.iter().map(|v| v.to_string()).collect(),
        notes: notes.to_string(),
    }
}

fn step(order: i32, title: &str, detail: &str) -> RepairStep {
    RepairStep {
        order,
        title: title.to_string(),
        detail: detail.to_string(),
    }
}

fn strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|v| v.to_string()).collect()
}

fn cabinet_hinge() -> DiagnosisResult {
    DiagnosisResult {
        issue_title: "Loose cabinet hinge causing door sag".to_string(),
        confidence: 86,
        difficulty: Difficulty::Easy,
        estimated_minutes: 25,
        high_level_overview: strings(&[
            "Tighten hinge screws and inspect for stripped holes",
            "Replace hinge or add wood filler if the screws won't hold",
            "Realign the door to restore even gaps",
        ]),
        tools: vec![
            tool("Phillips screwdriver", 1, true),
            tool("Wood filler", 1, false),
            tool("Drill with 1/8 in bit", 1, false),
        ],
        parts: vec![
            part(
                "Cabinet hinge",
                &["35mm cup", "Overlay"],
                "Match the cup diameter and overlay style.",
            ),
            part(
                "#6 wood screws",
                &["1 in", "1-1/4 in"],
                "Longer screws help if holes are stripped.",
            ),
        ],
        steps: vec![
            step(1, "Inspect the hinge", "Check if the hinge plate is loose or bent."),
            step(2, "Tighten screws", "Tighten all hinge screws and test alignment."),
            step(3, "Check screw holes", "If screws spin, remove them and inspect holes."),
            step(4, "Reinforce holes", "Add wood filler or toothpicks with glue, then let dry."),
            step(5, "Re-drill pilot holes", "Drill a small pilot hole to prevent splitting."),
            step(6, "Reinstall hinge", "Reattach the hinge using longer screws if needed."),
            step(7, "Adjust alignment", "Use adjustment screws to align door gaps."),
            step(8, "Final check", "Open and close the door to confirm smooth movement."),
        ],
        safety_checklist: strings(&[
            "Keep fingers clear of hinge pinch points",
            "Wear eye protection when drilling",
        ]),
        common_mistakes: strings(&[
            "Overtightening and stripping hinge screws",
            "Replacing the hinge without matching overlay style",
        ]),
        verify_before_buy: strings(&[
            "Confirm the hinge cup diameter (typically 35mm)",
            "Check overlay type to match the existing door",
        ]),
    }
}

fn leaky_faucet() -> DiagnosisResult {
    DiagnosisResult {
        issue_title: "Leaky faucet handle at base".to_string(),
        confidence: 78,
        difficulty: Difficulty::Medium,
        estimated_minutes: 40,
        high_level_overview: strings(&[
            "Shut off water and remove handle",
            "Replace worn cartridge or O-rings",
            "Reassemble and test for leaks",
        ]),
        tools: vec![
            tool("Adjustable wrench", 1, true),
            tool("Allen key set", 1, true),
            tool("Needle-nose pliers", 1, false),
        ],
        parts: vec![
            part(
                "Faucet cartridge",
                &["Ceramic", "Compression"],
                "Match the faucet brand and model.",
            ),
            part(
                "O-ring set",
                &["Standard", "Metric"],
                "Bring the old O-ring to match size.",
            ),
        ],
        steps: vec![
            step(1, "Turn off water", "Shut off the hot and cold supply valves."),
            step(2, "Remove handle", "Locate the set screw and remove the handle."),
            step(3, "Inspect cartridge", "Check the cartridge for wear or cracks."),
            step(4, "Remove cartridge", "Use pliers to pull the cartridge straight out."),
            step(5, "Replace seals", "Swap O-rings and lubricate lightly."),
            step(6, "Install new cartridge", "Seat the cartridge and align tabs."),
            step(7, "Reassemble handle", "Reattach the handle and tighten the set screw."),
            step(8, "Test", "Turn water back on and check for leaks."),
        ],
        safety_checklist: strings(&[
            "Turn off water before disassembly",
            "Cover the drain to avoid losing parts",
        ]),
        common_mistakes: strings(&[
            "Forcing the cartridge out and damaging housing",
            "Not matching the cartridge model",
        ]),
        verify_before_buy: strings(&[
            "Confirm faucet brand and model",
            "Match cartridge stem length and spline count",
        ]),
    }
}

fn sticking_drawer() -> DiagnosisResult {
    DiagnosisResult {
        issue_title: "Drawer sticking and not closing fully".to_string(),
        confidence: 82,
        difficulty: Difficulty::Easy,
        estimated_minutes: 30,
        high_level_overview: strings(&[
            "Check slides for debris or misalignment",
            "Tighten mounting screws and adjust",
            "Lubricate slides if needed",
        ]),
        tools: vec![
            tool("Screwdriver", 1, true),
            tool("Bubble level", 1, false),
            tool("Lubricant spray", 1, false),
        ],
        parts: vec![part(
            "Drawer slide set",
            &["Side-mount", "Soft-close"],
            "Match the slide length to the drawer depth.",
        )],
        steps: vec![
            step(1, "Remove drawer", "Release the slide clips and pull the drawer out."),
            step(2, "Inspect slides", "Look for debris or bent rails."),
            step(3, "Clean rails", "Wipe down slides and remove debris."),
            step(4, "Check mounting screws", "Tighten any loose mounting screws."),
            step(5, "Realign slides", "Use a level to ensure slides are parallel."),
            step(6, "Lubricate", "Apply a light lubricant to the slide rails."),
            step(7, "Reinstall drawer", "Align and slide the drawer back in."),
            step(8, "Test operation", "Open and close fully to confirm smooth action."),
        ],
        safety_checklist: strings(&[
            "Support the drawer to avoid drops",
            "Keep hands clear of pinch points",
        ]),
        common_mistakes: strings(&[
            "Replacing slides without matching length",
            "Over-lubricating and attracting debris",
        ]),
        verify_before_buy: strings(&[
            "Measure drawer depth for slide length",
            "Confirm slide type (side-mount vs soft-close)",
        ]),
    }
}
