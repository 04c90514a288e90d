//! Instruction sent to the text-generation provider for one card.

use crate::catalog::CatalogEntry;

/// Currency a card's denominations should be quoted in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Currency {
    Usd,
    Pkr,
    Qar,
}

impl Currency {
    pub fn code(self) -> &'static str {
        match self {
            Currency::Usd => "USD",
            Currency::Pkr => "PKR",
            Currency::Qar => "QAR",
        }
    }

    /// Example ladder quoted to the provider.
    fn ladder_hint(self) -> &'static str {
        match self {
            Currency::Usd => "$10, $25, $50, $100, $200",
            Currency::Pkr => "₨500, ₨1000, ₨2000, ₨5000",
            Currency::Qar => "50 QAR, 100 QAR, 200 QAR, 500 QAR",
        }
    }
}

/// Market currency: USD whenever the US is listed, otherwise decided by
/// the primary country.
pub fn currency_for(entry: &CatalogEntry) -> Currency {
    if entry.is_available_in("US") {
        return Currency::Usd;
    }
    match entry.primary_country().map(|c| c.iso_code.to_ascii_uppercase()) {
        Some(iso) if iso == "PK" => Currency::Pkr,
        Some(iso) if iso == "QA" => Currency::Qar,
        _ => Currency::Usd,
    }
}

fn or_na(field: &Option<String>) -> &str {
    field
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .unwrap_or("N/A")
}

const OUTPUT_FORMAT: &str = r#"=== OUTPUT FORMAT ===
Return ONLY valid JSON with this exact shape:
{
  "metaTitle": "SEO page title, format 'Buy {Brand} Gift Card Online | Instant Delivery to {top country}'. Max 60 chars.",
  "metaDescription": "Mention the brand, instant delivery and a key country. Max 155 chars.",
  "heroHeadline": "3-8 words including the brand name.",
  "heroSubheadline": "1-2 sentences naming a specific benefit, e.g. how many countries it works in.",
  "aboutTitle": "Section heading, e.g. 'About {Brand} Gift Cards'",
  "aboutBody": "3 paragraphs in <p> tags: what the card buys on this platform; who it suits, naming specific countries from the card data; how purchase and instant email delivery work.",
  "whyBuyTitle": "Section heading, e.g. 'Why Buy a {Brand} Gift Card?'",
  "whyBuyBody": "3 paragraphs in <p> tags: instant digital delivery; cross-border gifting naming specific countries from the card data; trust, security and payment flexibility.",
  "faqs": [ { "question": "string", "answer": "2-4 sentences; may use <strong>, <em> and <a> tags" } ],
  "denominations": [ { "value": 10, "currency": "USD", "label": "$10" } ]
}"#;

const FAQ_REQUIREMENTS: &str = "=== FAQ REQUIREMENTS ===
Generate exactly 6 FAQs. Use the actual card data to make answers specific. Cover:
1. How to redeem this gift card (step by step, from the redemption data)
2. Does it expire? (use the expiry data)
3. Which countries can I use it in? (list specific countries)
4. What happens to unused balance?
5. Can I get a refund? (use the terms data)
6. How quickly will I receive my code?";

/// Build the single natural-language instruction for `entry`.
pub fn build_instruction(entry: &CatalogEntry) -> String {
    let name = entry.display_name.trim();
    let brand = entry
        .brand
        .as_deref()
        .filter(|b| !b.trim().is_empty())
        .unwrap_or(name);
    let countries = if entry.countries.is_empty() {
        "N/A".to_string()
    } else {
        entry
            .countries
            .iter()
            .map(|c| format!("{} ({})", c.name, c.iso_code))
            .collect::<Vec<_>>()
            .join(", ")
    };
    let locations = entry
        .usage_locations
        .as_ref()
        .filter(|l| !l.is_empty())
        .map(|l| l.join(", "))
        .unwrap_or_else(|| "N/A".to_string());
    let categories = if entry.categories.is_empty() {
        "N/A".to_string()
    } else {
        entry.categories.join(", ")
    };
    let currency = currency_for(entry);

    format!(
        "You are a senior SEO copywriter for an international gift card store. Write in a \
professional but approachable second-person tone. Many buyers send gift cards to family and \
friends living abroad, so emphasise the international gifting angle.

Generate JSON content for a landing page selling \"{name}\" gift cards.

=== CARD DATA ===
Card name: {name}
Brand: {brand}
Description: {description}
Redeemable in: {countries}
How to redeem: {redeem}
Expiry: {expiry}
Additional terms: {terms}
Where to use: {locations}
Support/contact: {contact}
Categories: {categories}

{OUTPUT_FORMAT}

{FAQ_REQUIREMENTS}

=== DENOMINATION REQUIREMENTS ===
Generate 4-6 denominations in ascending order, all in {code} (for example {ladder}). \
Use realistic values for that market.

Name real countries from the card data. Do NOT produce generic filler content.",
        description = or_na(&entry.description),
        redeem = or_na(&entry.redemption_instructions),
        expiry = or_na(&entry.expiry_policy),
        terms = or_na(&entry.additional_terms),
        contact = or_na(&entry.support_contact),
        code = currency.code(),
        ladder = currency.ladder_hint(),
    )
}
