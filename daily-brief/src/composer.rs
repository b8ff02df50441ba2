//! Prompt composition.
//!
//! Pure string assembly. The analytical rules below are fixed text that the
//! generation service is asked to honour; nothing here checks its output.

use chrono::NaiveDate;

use crate::volatility::VolatilityRegime;

/// Role description sent alongside the prompt.
pub const SYSTEM_ROLE: &str = "You are a professional equity market research analyst. \
You write calm, factual daily market briefs for long-term investors using only the data you are given.";

/// Text used in place of the regime when the domestic basket is unavailable.
pub const REGIME_UNAVAILABLE: &str = "Not determined (domestic index data unavailable)";

const REQUIRED_SECTIONS: &str = "\
Your brief must include the following sections:

1. Market Overview
Explain what happened in the market today using the domestic index data.
If the move is small, clearly say so. Use the volatility regime to set the tone.

2. Global Context
Summarise how major global indices moved and whether domestic markets tracked them.

3. Institutional Flows
Report FII and DII net figures exactly as given and cite the flow source label.

4. Key Drivers
Identify the main factors influencing the market today.
Base this strictly on the news provided. Avoid dramatic language.

5. Nature of the Move
State whether the movement appears sentiment-driven, data-driven, or policy-driven.
Explain briefly why.

6. Investor Interpretation
Explain how a long-term investor should interpret today's action.
Do NOT give buy/sell calls. Focus on mindset and risk awareness.

End with a short section titled: \"Investor Takeaway\".";

const ANALYTICAL_RULES: &str = "\
Rules:
- Data hierarchy: domestic index data first, then institutional flows, then global indices, then news. \
When sources disagree, the higher-priority source decides the tone.
- Do not introduce any fact, figure, event or name that is not stated in the data above.
- Attribute a move to a driver only when a news item above supports it. \
Otherwise describe the move without assigning a cause.
- If a data block says it is unavailable or could not be retrieved, say so plainly in the \
relevant section. Do not estimate, infer or fill in the missing values.
- Compare the direction of net institutional flows with the direction of the domestic indices. \
State whether they agree or diverge, and do not claim flows caused the move.
- If headlines appear exaggerated, rely on index data to moderate tone.
- Do not predict future market levels. Do not speculate.
- Use calm, professional language.";

/// Everything the composer embeds, already rendered to text.
#[derive(Debug, Clone)]
pub struct BriefInputs<'a> {
    pub date: NaiveDate,
    pub domestic: &'a str,
    pub global: &'a str,
    pub regime: Option<VolatilityRegime>,
    pub flows: &'a str,
    pub news: &'a str,
}

/// Build the full prompt.
pub fn compose_prompt(inputs: &BriefInputs<'_>) -> String {
    let regime = inputs
        .regime
        .map(|r| r.label())
        .unwrap_or(REGIME_UNAVAILABLE);

    format!(
        "Using ONLY the verified data provided below, write a ONE-PAGE daily market brief.\n\
         \n\
         DATE:\n{date}\n\
         \n\
         DOMESTIC INDICES:\n{domestic}\n\
         \n\
         VOLATILITY REGIME:\n{regime}\n\
         \n\
         GLOBAL INDICES:\n{global}\n\
         \n\
         INSTITUTIONAL FLOWS (FII/DII, INR crore):\n{flows}\n\
         \n\
         VERIFIED NEWS:\n{news}\n\
         \n\
         {sections}\n\
         \n\
         {rules}\n",
        date = inputs.date.format("%d %b %Y"),
        domestic = inputs.domestic,
        regime = regime,
        global = inputs.global,
        flows = inputs.flows,
        news = inputs.news,
        sections = REQUIRED_SECTIONS,
        rules = ANALYTICAL_RULES,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::flow::FLOW_UNAVAILABLE;
    use crate::market::{DOMESTIC_UNAVAILABLE, GLOBAL_UNAVAILABLE};
    use crate::news::NEWS_UNAVAILABLE;

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, 16).unwrap()
    }

    #[test]
    fn test_prompt_embeds_all_blocks() {
        let prompt = compose_prompt(&BriefInputs {
            date: date(),
            domestic: "NIFTY 50: 99.00 (-1.00 pts, -1.00%) as of 16 Oct 2026",
            global: "S&P 500: 5000.00 (+10.00 pts, +0.20%) as of 15 Oct 2026",
            regime: Some(VolatilityRegime::Elevated),
            flows: "Date: 16-Oct-2026\nSource: Archive Data\nFII net: -1,234.56\nDII net: 2,345.67",
            news: "1. Market update",
        });

        assert!(prompt.contains("DATE:\n16 Oct 2026"));
        assert!(prompt.contains("NIFTY 50: 99.00"));
        assert!(prompt.contains("VOLATILITY REGIME:\nElevated"));
        assert!(prompt.contains("Source: Archive Data"));
        assert!(prompt.contains("1. Market update"));
        assert!(prompt.contains("Investor Takeaway"));
        assert!(prompt.contains("Data hierarchy"));
    }

    #[test]
    fn test_prompt_carries_sentinels_verbatim() {
        let prompt = compose_prompt(&BriefInputs {
            date: date(),
            domestic: DOMESTIC_UNAVAILABLE,
            global: GLOBAL_UNAVAILABLE,
            regime: None,
            flows: FLOW_UNAVAILABLE,
            news: NEWS_UNAVAILABLE,
        });

        for sentinel in [DOMESTIC_UNAVAILABLE, GLOBAL_UNAVAILABLE, FLOW_UNAVAILABLE, NEWS_UNAVAILABLE] {
            assert!(prompt.contains(sentinel), "missing {sentinel}");
        }
        assert!(prompt.contains(REGIME_UNAVAILABLE));
    }

    #[test]
    fn test_prompt_is_deterministic() {
        let inputs = BriefInputs {
            date: date(),
            domestic: "d",
            global: "g",
            regime: Some(VolatilityRegime::Low),
            flows: "f",
            news: "n",
        };
        assert_eq!(compose_prompt(&inputs), compose_prompt(&inputs));
    }
}
