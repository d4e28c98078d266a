//! Ordered pattern -> reply rules for intent classification.
//!
//! Rules are evaluated in a fixed priority order, first match wins:
//! exact FAQ phrases, then greeting/command prefixes, then topic regexes.
//! Rule replies are never cached so edits to this table take effect
//! immediately.

use regex::Regex;

use crate::pipeline::responses;

enum Matcher {
    /// Verbatim phrases, compared after trimming trailing punctuation.
    Exact(&'static [&'static str]),
    Pattern(Regex),
}

struct Rule {
    matcher: Matcher,
    reply: &'static str,
}

impl Rule {
    fn matches(&self, normalized: &str) -> bool {
        match &self.matcher {
            Matcher::Exact(phrases) => {
                let stripped = normalized.trim_end_matches(['?', '!', '.']).trim_end();
                phrases.contains(&stripped)
            }
            Matcher::Pattern(re) => re.is_match(normalized),
        }
    }
}

/// The full rule table, built once at startup.
pub struct RuleSet {
    rules: Vec<Rule>,
}

impl RuleSet {
    pub fn new() -> Self {
        let mut rules = Vec::new();

        // Tier 1: exact-phrase FAQ sets. Most specific, never shadowed.
        let exact: &[(&'static [&'static str], &'static str)] = &[
            (&["what services do you offer", "services"], responses::SERVICES),
            (
                &["do you offer mobile app development", "what about cybersecurity"],
                responses::MOBILE_APP,
            ),
            (
                &[
                    "can you integrate apis into my website or app",
                    "i need help with integration of api into my website",
                ],
                responses::API_INTEGRATION,
            ),
            (
                &["do you offer technical support", "i need help with technical support"],
                responses::TECHNICAL_SUPPORT,
            ),
            (
                &[
                    "do you offer e-commerce solutions",
                    "i need help with e-commerce",
                    "i need website, i sell products online",
                ],
                responses::ECOMMERCE,
            ),
            (
                &[
                    "how much does a basic website cost",
                    "how much do you charge for a basic website",
                    "what is the price of a basic website",
                ],
                responses::WEBSITE_COST,
            ),
            (
                &[
                    "what is the cost of an e-commerce website",
                    "how much does an e-commerce website cost",
                    "how much do you charge for an e-commerce website",
                ],
                responses::ECOMMERCE,
            ),
            (
                &[
                    "what are your payment methods",
                    "payment method",
                    "if i want to pay how",
                    "how do i pay",
                ],
                responses::PAYMENT_METHODS,
            ),
            (
                &[
                    "how much does hosting cost",
                    "how much do you charge for hosting",
                    "what is the price of hosting",
                ],
                responses::HOSTING_COST,
            ),
            (
                &[
                    "what is the cost of domain registration",
                    "how much does domain registration cost",
                    "what is the price of domain registration",
                ],
                responses::DOMAIN_COST,
            ),
            (
                &[
                    "do you offer website maintenance",
                    "i need help with website maintenance",
                    "i need some maintenance on my website",
                ],
                responses::MAINTENANCE,
            ),
            (
                &[
                    "can you fix my broken website",
                    "my website seems not be working, can you help me",
                    "i need help with fixing my website",
                ],
                responses::FIX_WEBSITE,
            ),
            (
                &[
                    "can you update my website",
                    "i need help with updating my website",
                    "i need some updates on my website",
                ],
                responses::UPDATE_WEBSITE,
            ),
            (
                &[
                    "how long will it take to build my website",
                    "how long does it take to build a website",
                    "what is the time frame for building a website",
                ],
                responses::WEBSITE_TIMELINE,
            ),
            (
                &[
                    "how long will it take to build my mobile app",
                    "how long does it take to build a mobile app",
                    "what is the time frame for building a mobile app",
                ],
                responses::MOBILE_APP_TIMELINE,
            ),
            (
                &[
                    "how long will it take to build my e-commerce website",
                    "how long does it take to build an e-commerce website",
                    "what is the time frame for building an e-commerce website",
                ],
                responses::ECOMMERCE_TIMELINE,
            ),
            (
                &[
                    "how long will it take to build my api",
                    "how long does it take to build an api",
                    "what is the time frame for building an api",
                ],
                responses::API_TIMELINE,
            ),
        ];
        for (phrases, reply) in exact {
            rules.push(Rule { matcher: Matcher::Exact(phrases), reply });
        }

        // Tier 2: greeting/command prefixes and pleasantries.
        let prefix: &[(&str, &'static str)] = &[
            (r"(?i)^(hi|hello|hey|good (morning|afternoon|evening))\b", responses::GREETING),
            (r"(?i)^help$", responses::HELP),
            (r"(?i)^admin$", responses::ADMIN_HELP),
            (r"(?i)thank you|thanks|appreciate", responses::THANK_YOU),
            (r"(?i)how are you", responses::HOW_ARE_YOU),
        ];
        for (pattern, reply) in prefix {
            rules.push(Rule {
                matcher: Matcher::Pattern(Regex::new(pattern).unwrap()),
                reply,
            });
        }

        // Tier 3: broad topic regexes, lowest priority.
        let topics: &[(&str, &'static str)] = &[
            (r"(?i)school.*(website|site)", responses::SCHOOL),
            (r"(?i)e-?commerce.*(website|site)", responses::ECOMMERCE),
            (r"(?i)domain|hosting", responses::DOMAIN),
            (r"(?i)maintenance|update|fix", responses::MAINTENANCE),
            (r"(?i)price|cost|how much", responses::PRICING),
            (r"(?i)website|web.*(development|design)", responses::WEB_DEV),
            (r"(?i)mobile.*(app|application)", responses::MOBILE_DEV),
            (r"(?i)\bapi", responses::API_DEV),
            (r"(?i)cyber.*(security|security assessment)", responses::CYBERSECURITY),
            (r"(?i)freelance|freelancing", responses::FREELANCE),
            (r"(?i)mobile.*(friendly|responsive)", responses::RESPONSIVE),
            (r"(?i)seo|search.*engine.*optimization", responses::SEO),
            (r"(?i)tech.*(stack|technology)", responses::TECH_STACK),
            (r"(?i)frontend|backend|fullstack", responses::FULLSTACK),
            (r"(?i)code|programming|software", responses::PROGRAMMING),
            (r"(?i)bug|error|issue|problem", responses::DEBUGGING),
        ];
        for (pattern, reply) in topics {
            rules.push(Rule {
                matcher: Matcher::Pattern(Regex::new(pattern).unwrap()),
                reply,
            });
        }

        Self { rules }
    }

    /// Classify a normalized body. `None` means no rule matched and the
    /// coordinator should defer to the cache/fallback path.
    pub fn classify(&self, normalized: &str) -> Option<&'static str> {
        if normalized.is_empty() {
            return None;
        }
        self.rules.iter().find(|r| r.matches(normalized)).map(|r| r.reply)
    }
}

impl Default for RuleSet {
    fn default() -> Self {
        Self::new()
    }
}
