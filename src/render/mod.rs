//! Plain-text rendering of conversation snapshots for the terminal.
//!
//! Rendering only reads [`Message`] values; all decisions about which tier a
//! response belongs to were made by the classifier.

use std::io::{self, Write};

use crate::classify::{ClassifiedResponse, ConfidenceStyle, EvidenceView, TierDetail};
use crate::conversation::{Message, MessageContent};

/// Text shown while a response is pending.
pub const THINKING_TEXT: &str = "Analyzing medical evidence...";

/// Sample symptom descriptions offered to new users.
pub const EXAMPLE_QUERIES: &[&str] = &[
    "I have fever and headache",
    "Chest pain when breathing",
    "Sore throat and cough",
    "Skin rash with itching",
];

const BAR_WIDTH: usize = 20;

/// Rendering switches.
#[derive(Debug, Clone, Copy, Default)]
pub struct RenderOptions {
    /// Show reasoning and the evidence panel under standard answers.
    pub show_explanation: bool,
}

/// Writes messages as plain text.
#[derive(Debug, Clone, Copy, Default)]
pub struct Renderer {
    options: RenderOptions,
}

impl Renderer {
    pub fn new(options: RenderOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> RenderOptions {
        self.options
    }

    /// Toggle the explanation panel.
    pub fn set_show_explanation(&mut self, show: bool) {
        self.options.show_explanation = show;
    }

    /// Render every message in order, separated by blank lines.
    pub fn render_all<W: Write>(&self, out: &mut W, messages: &[Message]) -> io::Result<()> {
        for (i, message) in messages.iter().enumerate() {
            if i > 0 {
                writeln!(out)?;
            }
            self.render_message(out, message)?;
        }
        Ok(())
    }

    /// Render a single message.
    pub fn render_message<W: Write>(&self, out: &mut W, message: &Message) -> io::Result<()> {
        match &message.content {
            MessageContent::Query(text) => writeln!(out, "> {}", text),
            MessageContent::Pending => writeln!(out, "... {}", THINKING_TEXT),
            MessageContent::Response(classified) => self.render_response(out, classified),
        }
    }

    /// Render a classified response according to its tier.
    pub fn render_response<W: Write>(
        &self,
        out: &mut W,
        response: &ClassifiedResponse,
    ) -> io::Result<()> {
        match &response.detail {
            TierDetail::Emergency { actions } => {
                writeln!(out, "!! MEDICAL EMERGENCY SUSPECTED !!")?;
                if let Some(reason) = non_empty(response.raw.refusal_reason.as_deref()) {
                    writeln!(out, "{}", reason)?;
                }
                writeln!(out, "Recommended Actions:")?;
                for action in actions.iter() {
                    writeln!(out, "  - {}", action)?;
                }
                if !response.disclaimer().is_empty() {
                    writeln!(out, "{}", response.disclaimer())?;
                }
                Ok(())
            }
            TierDetail::Refusal { reason_lines } => {
                writeln!(out, "Query Handled with Caution")?;
                for line in reason_lines {
                    writeln!(out, "{}", line)?;
                }
                if !response.disclaimer().is_empty() {
                    writeln!(out, "-- {}", response.disclaimer())?;
                }
                Ok(())
            }
            TierDetail::Standard {
                confidence,
                evidence,
            } => self.render_standard(out, response, confidence, evidence),
        }
    }

    fn render_standard<W: Write>(
        &self,
        out: &mut W,
        response: &ClassifiedResponse,
        confidence: &ConfidenceStyle,
        evidence: &[EvidenceView],
    ) -> io::Result<()> {
        match confidence.label.as_deref() {
            Some(label) => writeln!(out, "Health Assistant [{} Confidence]", label)?,
            None => writeln!(out, "Health Assistant")?,
        }
        writeln!(out, "{}", response.raw.answer)?;

        if let Some(label) = confidence.label.as_deref() {
            writeln!(
                out,
                "Confidence Score {} {}",
                bar(confidence.weight),
                label
            )?;
        }
        writeln!(
            out,
            "Based on {} evidence source{}.",
            evidence.len(),
            if evidence.len() == 1 { "" } else { "s" }
        )?;

        if self.options.show_explanation {
            if let Some(explanation) = non_empty(Some(response.raw.explanation.as_str())) {
                writeln!(out, "Logic & Reasoning:")?;
                for line in explanation.lines() {
                    writeln!(out, "  {}", line)?;
                }
            }
            if !evidence.is_empty() {
                writeln!(out, "Supporting Evidence:")?;
                for (index, item) in evidence.iter().enumerate() {
                    render_evidence(out, index, item)?;
                }
            }
        }

        if response.elevated_disclaimer() {
            writeln!(out, "Disclaimer (elevated risk): {}", response.disclaimer())
        } else {
            writeln!(out, "Disclaimer: {}", response.disclaimer())
        }
    }
}

fn render_evidence<W: Write>(out: &mut W, index: usize, item: &EvidenceView) -> io::Result<()> {
    writeln!(
        out,
        "  Ref {} [{} Relevance] Match {} {}%",
        index + 1,
        item.relevance,
        bar(item.score_percent),
        item.score_percent
    )?;
    writeln!(out, "    \"{}\"", item.content)?;
    if !item.source.is_empty() {
        writeln!(out, "    {}", item.source)?;
    }
    Ok(())
}

/// Fixed-width bar for a weight out of 100.
fn bar(weight: u8) -> String {
    let filled = (usize::from(weight.min(100)) * BAR_WIDTH + 50) / 100;
    format!("[{}{}]", "#".repeat(filled), "-".repeat(BAR_WIDTH - filled))
}

fn non_empty(text: Option<&str>) -> Option<&str> {
    text.filter(|t| !t.trim().is_empty())
}

/// Render messages into a `String`.
pub fn render_to_string(renderer: &Renderer, messages: &[Message]) -> String {
    let mut buffer = Vec::new();
    let _ = renderer.render_all(&mut buffer, messages);
    String::from_utf8_lossy(&buffer).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::{EvidenceItem, RawResponse};
    use crate::classify::{classify, EMERGENCY_ACTIONS};
    use crate::conversation::ConversationStore;

    fn standard(confidence: Option<&str>, risk: Option<&str>) -> RawResponse {
        RawResponse {
            answer: "Drink fluids and rest.".to_string(),
            explanation: "Line A\nLine B".to_string(),
            confidence: confidence.map(str::to_string),
            evidence: vec![EvidenceItem::new("Fever guidance", "who.pdf").with_score(0.71)],
            is_safe: true,
            refusal_reason: None,
            risk_level: risk.map(str::to_string),
            disclaimer: String::new(),
        }
    }

    fn render_one(renderer: &Renderer, content: MessageContent) -> String {
        let mut store = ConversationStore::new();
        store.append(MessageContent::Query("fever".to_string()));
        let pending = store.append(MessageContent::Pending).unwrap();
        assert!(store.replace(pending, |_| content));
        render_to_string(renderer, &store.snapshot()[1..])
    }

    #[test]
    fn test_bar_widths() {
        assert_eq!(bar(0), format!("[{}]", "-".repeat(20)));
        assert_eq!(bar(100), format!("[{}]", "#".repeat(20)));
        assert_eq!(bar(90), format!("[{}--]", "#".repeat(18)));
        assert_eq!(bar(25), format!("[#####{}]", "-".repeat(15)));
    }

    #[test]
    fn test_user_and_pending() {
        let renderer = Renderer::default();
        let mut store = ConversationStore::new();
        store.append(MessageContent::Query("fever".to_string()));
        store.append(MessageContent::Pending);

        let text = render_to_string(&renderer, store.snapshot());
        assert_eq!(text, format!("> fever\n\n... {}\n", THINKING_TEXT));
    }

    #[test]
    fn test_emergency_lists_fixed_actions() {
        let raw = RawResponse {
            is_safe: false,
            risk_level: Some("High".to_string()),
            refusal_reason: Some("Please call 911 immediately.".to_string()),
            disclaimer: "EMERGENCY PROTOCOL".to_string(),
            ..standard(Some("High"), None)
        };
        let text = render_one(
            &Renderer::default(),
            MessageContent::response(classify(raw)),
        );

        assert!(text.starts_with("!! MEDICAL EMERGENCY SUSPECTED !!"));
        assert!(text.contains("Please call 911 immediately."));
        for action in EMERGENCY_ACTIONS {
            assert!(text.contains(action));
        }
        assert!(!text.contains("Drink fluids"));
        assert!(!text.contains("Confidence"));
    }

    #[test]
    fn test_refusal_renders_reason_lines() {
        let raw = RawResponse {
            is_safe: false,
            refusal_reason: Some("I cannot help with that.\nPlease see a doctor.".to_string()),
            disclaimer: "Educational only.".to_string(),
            ..standard(Some("High"), None)
        };
        let text = render_one(
            &Renderer::default(),
            MessageContent::response(classify(raw)),
        );

        assert_eq!(
            text,
            "Query Handled with Caution\nI cannot help with that.\nPlease see a doctor.\n-- Educational only.\n"
        );
    }

    #[test]
    fn test_standard_collapsed() {
        let text = render_one(
            &Renderer::default(),
            MessageContent::response(classify(standard(Some("High"), None))),
        );

        assert!(text.starts_with("Health Assistant [High Confidence]\nDrink fluids and rest.\n"));
        assert!(text.contains("Confidence Score"));
        assert!(text.contains("Based on 1 evidence source."));
        assert!(text.contains("Disclaimer: Not medical advice."));
        assert!(!text.contains("Logic & Reasoning"));
        assert!(!text.contains("Supporting Evidence"));
    }

    #[test]
    fn test_standard_without_confidence_has_no_bar() {
        let text = render_one(
            &Renderer::default(),
            MessageContent::response(classify(standard(None, None))),
        );

        assert!(text.starts_with("Health Assistant\n"));
        assert!(!text.contains("Confidence"));
    }

    #[test]
    fn test_standard_with_blank_confidence_has_no_bar() {
        let text = render_one(
            &Renderer::default(),
            MessageContent::response(classify(standard(Some(""), None))),
        );

        assert!(text.starts_with("Health Assistant\n"));
        assert!(!text.contains("Confidence"));
    }

    #[test]
    fn test_standard_expanded_with_elevated_disclaimer() {
        let renderer = Renderer::new(RenderOptions {
            show_explanation: true,
        });
        let text = render_one(
            &renderer,
            MessageContent::response(classify(standard(Some("Medium"), Some("Moderate")))),
        );

        assert!(text.contains("Logic & Reasoning:\n  Line A\n  Line B\n"));
        assert!(text.contains("Supporting Evidence:"));
        assert!(text.contains("Ref 1 [High Relevance]"));
        assert!(text.contains("71%"));
        assert!(text.contains("    who.pdf"));
        assert!(text.contains("Disclaimer (elevated risk): Not medical advice."));
    }

    #[test]
    fn test_toggle_explanation() {
        let mut renderer = Renderer::default();
        assert!(!renderer.options().show_explanation);
        renderer.set_show_explanation(true);
        assert!(renderer.options().show_explanation);
    }
}
