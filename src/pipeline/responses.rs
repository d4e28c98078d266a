//! Static reply texts for the rule-based classifier.

pub const GREETING: &str = "Hello! I’m your technical assistant. Type \"help\" for services.";

pub const THANK_YOU: &str = "You’re welcome!";

pub const HOW_ARE_YOU: &str = "I’m great! Ready to assist. What do you need?";

pub const HELP: &str = "Available services:\n\
- Website Development\n\
- Cyber Security\n\
- Mobile Apps\n\
- API Development\n\n\
You can also ask about pricing, domain/hosting, or maintenance.";

pub const ADMIN_HELP: &str = "Admin Commands:\n\
- !status\n- !info\n- !stats\n- !exit\n- !remove (in groups only)";

pub const SCHOOL: &str = "🏫 *School Website*:\n\
- Basic site: GHS 2,000+\n\
- Advanced portal: GHS 4,000+\n\
Note: Domain and hosting not included.";

pub const ECOMMERCE: &str = "🛒 *E-Commerce Website*:\n\
- Starting from GHS 3,500\n\
Includes product catalog, checkout, payment integration.\n\
Custom features may cost more.";

pub const DOMAIN: &str = "🌐 *Domain & Hosting*:\n\
- Domain: GHS 150+/year\n\
- Hosting: GHS 250+/year\n\
I can help with setup and DNS config.";

pub const MAINTENANCE: &str = "🛠️ *Website Maintenance*:\n\
- GHS 50/hour for fixes, updates, and support\n\
Let us know your needs for a custom plan.";

pub const PRICING: &str = "💰 *Service Pricing*:\n\
- 🌍 Website: GHS 2,000+ (basic), GHS 4,000+ (custom)\n\
- 🔐 Cyber Security: GHS 4,000+ (assessment)\n\
- 📱 Mobile Apps: GHS 4,000+ (basic), GHS 7,000+ (custom)\n\
- 🖥️ Tech Support: GHS 50/hour\n\n\
Ask about packages or get a quote!";

pub const SERVICES: &str = "We offer web development, mobile app development, e-commerce solutions, \
website maintenance, API integration, and technical support.";

pub const MOBILE_APP: &str = "Yes, we conduct security assessments and implement hardening measures \
starting from GHS 4,000+, depending on the project's scope.";

pub const API_INTEGRATION: &str = "Absolutely, we specialize in building and integrating APIs for both \
web and mobile applications. Contact us for a custom quote.";

pub const TECHNICAL_SUPPORT: &str = "Yes, we provide technical support for web and mobile applications. \
Our rate is GHS 50/hour.";

pub const WEBSITE_COST: &str = "Our basic websites start at GHS 2,000. Custom portals and e-commerce \
platforms can range from GHS 4,000 upwards. But it all depends on the kind of website and the features.";

pub const PAYMENT_METHODS: &str = "We accept Mobile Money (MoMo), bank transfers, and cash. \
A 50% deposit is required to commence work.";

pub const HOSTING_COST: &str = "Hosting services start from GHS 250 per year, depending on traffic, \
features, and resource requirements.";

pub const DOMAIN_COST: &str = "Domain names start at GHS 150 per year, varying based on the domain \
extension (.com, .org, etc.).";

pub const FIX_WEBSITE: &str = "Certainly. Please provide details or a screenshot, and we’ll assess \
and address the issue.";

pub const UPDATE_WEBSITE: &str = "Yes, we can help with updates. We can upgrade or redesign existing \
websites. Please share the details of what you need updated or let's discuss your specific goals and \
requirements.";

pub const WEBSITE_TIMELINE: &str = "The timeline depends on the project scope. A basic website \
typically takes 2-4 weeks, while custom projects may take longer. We’ll provide a timeline after \
discussing your requirements.";

pub const MOBILE_APP_TIMELINE: &str = "The timeline depends on the project scope. A basic mobile app \
typically takes 4-8 weeks, while custom projects may take longer. We’ll provide a timeline after \
discussing your requirements.";

pub const ECOMMERCE_TIMELINE: &str = "The timeline depends on the project scope. A basic e-commerce \
website typically takes 4-8 weeks, while custom projects may take longer. We’ll provide a timeline \
after discussing your requirements.";

pub const API_TIMELINE: &str = "The timeline depends on the project scope. A basic API typically \
takes 2-4 weeks, while custom projects may take longer. We’ll provide a timeline after discussing \
your requirements.";

pub const WEB_DEV: &str = "We specialize in web development. Please share your requirements for a quote.";

pub const MOBILE_DEV: &str = "We develop mobile apps for Android and iOS. Please share your requirements for a quote.";

pub const API_DEV: &str = "We build APIs for various applications. Please share your requirements for a quote.";

pub const CYBERSECURITY: &str = "We conduct security assessments and implement hardening measures. \
Please share your requirements for a quote.";

pub const FREELANCE: &str = "I can assist with freelance projects. Please share your requirements for a quote.";

pub const RESPONSIVE: &str = "We ensure websites are mobile-friendly. Please share your requirements for a quote.";

pub const SEO: &str = "We can optimize your website for search engines. Please share your requirements for a quote.";

pub const TECH_STACK: &str = "We can work with various tech stacks. Please share your requirements for a quote.";

pub const FULLSTACK: &str = "We can work on frontend, backend, or fullstack projects. Please share your requirements for a quote.";

pub const PROGRAMMING: &str = "We can assist with coding and programming tasks. Please share your requirements for a quote.";

pub const DEBUGGING: &str = "We can help with debugging and fixing issues. Please share your requirements for a quote.";
