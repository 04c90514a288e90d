//! Deterministic templated copy, built only from catalogue text.

use super::{Denomination, Faq, GeneratedContent};
use crate::catalog::CatalogEntry;

const LADDER_USD: [u32; 5] = [10, 25, 50, 100, 200];

/// `Some(text)` only for fields that actually carry text.
fn present(field: &Option<String>) -> Option<&str> {
    field.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

/// Build the full record for `entry` from fixed templates. Never fails.
pub fn fallback_content(entry: &CatalogEntry) -> GeneratedContent {
    let name = entry.display_name.trim();
    let countries = entry
        .country_list()
        .unwrap_or_else(|| "countries worldwide".to_string());
    let primary = entry
        .primary_country()
        .map(|c| c.name.as_str())
        .unwrap_or("worldwide");
    let description = present(&entry.description);

    let about_intro = description.map(str::to_string).unwrap_or_else(|| {
        format!("{name} gift cards are the perfect digital gift for friends and family.")
    });
    let expiry_note = present(&entry.expiry_policy)
        .unwrap_or("Check the provider's website for expiry and usage terms.");

    GeneratedContent {
        meta_title: format!("Buy {name} Gift Card Online | Instant Digital Delivery"),
        meta_description: format!(
            "Purchase {name} gift cards online with instant delivery. Available in {primary} \
             and more. Safe, secure, and trusted by millions."
        ),
        hero_headline: format!("{name} Gift Card"),
        hero_subheadline: description.map(str::to_string).unwrap_or_else(|| {
            format!(
                "Send a {name} gift card instantly to your loved ones. Digital delivery, no hassle."
            )
        }),
        about_title: format!("About {name} Gift Cards"),
        about_body: format!(
            "<p>{about_intro}</p>\n\
             <p>Available for use in {countries}. Purchase securely and receive your code \
             instantly via email, ready to redeem in seconds.</p>\n\
             <p>{expiry_note}</p>"
        ),
        why_buy_title: format!("Why Buy a {name} Gift Card?"),
        why_buy_body: format!(
            "<p>A {name} gift card is the perfect way to show someone you care, no matter \
             where they are in the world. Choose from multiple denominations and send the code \
             instantly.</p>\n\
             <p>Our platform ensures safe and secure payments with instant digital delivery. \
             Your recipient gets their code by email within seconds.</p>\n\
             <p>Whether it's a birthday, holiday, or just because, a {name} gift card is always \
             the right choice.</p>"
        ),
        faqs: fallback_faqs(entry, name, &countries),
        denominations: LADDER_USD
            .iter()
            .map(|&v| Denomination {
                value: f64::from(v),
                currency: "USD".to_string(),
                label: format!("${v}"),
            })
            .collect(),
    }
}

fn fallback_faqs(entry: &CatalogEntry, name: &str, countries: &str) -> Vec<Faq> {
    let faq = |question: String, answer: String| Faq { question, answer };

    vec![
        faq(
            format!("How do I redeem my {name} gift card?"),
            present(&entry.redemption_instructions)
                .map(str::to_string)
                .unwrap_or_else(|| {
                    format!(
                        "Visit the {name} website or app, sign in to your account, and enter \
                         the gift card code to add the balance."
                    )
                }),
        ),
        faq(
            format!("Does the {name} gift card expire?"),
            present(&entry.expiry_policy)
                .unwrap_or("Please check the provider's website for expiry information.")
                .to_string(),
        ),
        faq(
            "Which countries can I use this gift card in?".to_string(),
            format!("This gift card is available for use in: {countries}."),
        ),
        faq(
            "How quickly will I receive my gift card code?".to_string(),
            "Your code is delivered instantly via email after purchase. Most customers \
             receive it within 30 seconds."
                .to_string(),
        ),
        faq(
            format!("Can I get a refund on my {name} gift card?"),
            present(&entry.additional_terms)
                .unwrap_or(
                    "Gift cards are generally non-refundable. Please check the terms and \
                     conditions for details.",
                )
                .to_string(),
        ),
        faq(
            "Is it safe to buy gift cards online?".to_string(),
            "Yes! We use secure payment processing and are a certified reseller. Your \
             purchase is protected."
                .to_string(),
        ),
    ]
}
