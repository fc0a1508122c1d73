//! Built-in storefront tools.
//!
//! The standard tool set of the shopping assistant: catalog lookups, deal
//! and recommendation data, a price calculator, a compatibility checker,
//! and a setup builder. Each tool is constructed via [`FnTool::new`] and
//! returned as `Arc<dyn Tool>`; catalog data lives in-crate.

use std::sync::{Arc, OnceLock};

use regex::Regex;

use crate::error::ShopkeepError;
use crate::tools::tool::{FnTool, Tool};

fn number_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"\d+(?:\.\d+)?").expect("valid number pattern"))
}

fn pretty(value: serde_json::Value) -> Result<String, ShopkeepError> {
    Ok(serde_json::to_string_pretty(&value)?)
}

/// Create the `get_product_info` tool: catalog lookup by category.
///
/// Unknown categories return the whole catalog so the model can still
/// answer something useful.
pub fn product_info_tool() -> Arc<dyn Tool> {
    Arc::new(FnTool::new(
        "get_product_info",
        "Get detailed information about gaming products by category (pc, console, accessories, mobile)",
        |argument| async move {
            let category = argument.trim().to_lowercase();
            let catalog = product_catalog();
            let selected = catalog
                .get(category.as_str())
                .cloned()
                .unwrap_or(catalog);
            pretty(selected)
        },
    ))
}

/// Create the `get_current_deals` tool: current promotions.
pub fn current_deals_tool() -> Arc<dyn Tool> {
    Arc::new(FnTool::new(
        "get_current_deals",
        "Get current deals and promotions available in the store",
        |_argument| async move { pretty(current_deals()) },
    ))
}

/// Create the `product_recommendation` tool: budget and preference builds.
pub fn recommendation_tool() -> Arc<dyn Tool> {
    Arc::new(FnTool::new(
        "product_recommendation",
        "Get product recommendations based on budget, gaming preference, or specific needs",
        |_argument| async move { pretty(recommendations()) },
    ))
}

/// Create the `calculate_price` tool.
///
/// Understands `a + b + ...` (sum), `a - b` (discount), and `a * b`
/// (quantity); anything else gets a usage hint rather than an error.
pub fn price_calculator_tool() -> Arc<dyn Tool> {
    Arc::new(FnTool::new(
        "calculate_price",
        "Calculate total price including discounts, taxes, or bundle deals",
        |argument| async move { Ok(calculate_price(&argument)) },
    ))
}

/// Create the `check_compatibility` tool.
pub fn compatibility_tool() -> Arc<dyn Tool> {
    Arc::new(FnTool::new(
        "check_compatibility",
        "Check if gaming components are compatible with each other",
        |_argument| async move {
            pretty(serde_json::json!({
                "status": "Compatible",
                "notes": [
                    "All components are compatible",
                    "Recommended PSU: 650W or higher",
                    "Ensure case has enough clearance for GPU",
                    "Check RAM speed compatibility with motherboard",
                ],
                "potential_issues": [
                    "Some B450 motherboards may need BIOS update for newer CPUs",
                    "Check GPU length vs case clearance",
                    "Verify PSU has required PCIe connectors",
                ],
            }))
        },
    ))
}

/// Create the `gaming_setup_builder` tool: complete builds by budget tier.
pub fn setup_builder_tool() -> Arc<dyn Tool> {
    Arc::new(FnTool::new(
        "gaming_setup_builder",
        "Build a complete gaming setup based on budget and preferences",
        |_argument| async move { pretty(setups()) },
    ))
}

/// Create the `get_store_info` tool: contact details, hours, policies.
pub fn store_info_tool() -> Arc<dyn Tool> {
    Arc::new(FnTool::new(
        "get_store_info",
        "Get store information including contact details, location, and policies",
        |_argument| async move { pretty(store_info()) },
    ))
}

/// Return all built-in storefront tools, in the order they are advertised.
pub fn all_tools() -> Vec<Arc<dyn Tool>> {
    vec![
        product_info_tool(),
        current_deals_tool(),
        recommendation_tool(),
        price_calculator_tool(),
        compatibility_tool(),
        setup_builder_tool(),
        store_info_tool(),
    ]
}

fn calculate_price(expression: &str) -> String {
    let numbers: Vec<f64> = number_pattern()
        .find_iter(expression)
        .filter_map(|m| m.as_str().parse().ok())
        .collect();

    if !numbers.is_empty() {
        if expression.contains('+') {
            let total: f64 = numbers.iter().sum();
            return format!("Total: ${total:.2}");
        }
        if expression.contains('-') && numbers.len() >= 2 {
            return format!("After discount: ${:.2}", numbers[0] - numbers[1]);
        }
        if expression.contains('*') && numbers.len() >= 2 {
            return format!("Total: ${:.2}", numbers[0] * numbers[1]);
        }
    }

    "Please provide a valid calculation (e.g., '299.99 + 99.99' or '499 - 50')".to_string()
}

fn product_catalog() -> serde_json::Value {
    serde_json::json!({
        "pc": {
            "category": "PC Gaming",
            "products": [
                {
                    "name": "RTX 4090 Graphics Card",
                    "price": "$1,599",
                    "description": "Ultimate 4K gaming performance",
                    "specs": "24GB GDDR6X, 2520MHz boost clock",
                },
                {
                    "name": "Intel Core i9-13900K",
                    "price": "$589",
                    "description": "High-performance gaming processor",
                    "specs": "24 cores, 32 threads, up to 5.8GHz",
                },
                {
                    "name": "DDR5 RGB Gaming RAM 32GB",
                    "price": "$299",
                    "description": "High-speed gaming memory",
                    "specs": "5600MHz, RGB lighting, low latency",
                },
            ],
        },
        "console": {
            "category": "Gaming Consoles",
            "products": [
                {
                    "name": "PlayStation 5",
                    "price": "$499",
                    "description": "Next-gen console gaming",
                    "specs": "Custom SSD, 4K gaming, Ray tracing",
                },
                {
                    "name": "Xbox Series X",
                    "price": "$499",
                    "description": "Most powerful Xbox ever",
                    "specs": "12 TFLOPS, 4K/120fps, Quick Resume",
                },
                {
                    "name": "Nintendo Switch OLED",
                    "price": "$349",
                    "description": "Portable and docked gaming",
                    "specs": "7-inch OLED screen, enhanced audio",
                },
            ],
        },
        "accessories": {
            "category": "Gaming Accessories",
            "products": [
                {
                    "name": "Gaming Mouse Pro",
                    "price": "$79",
                    "description": "Precision gaming mouse",
                    "specs": "25,600 DPI, RGB lighting, 8 buttons",
                },
                {
                    "name": "Mechanical Gaming Keyboard",
                    "price": "$129",
                    "description": "Responsive mechanical switches",
                    "specs": "Cherry MX switches, RGB backlighting",
                },
                {
                    "name": "Gaming Headset 7.1",
                    "price": "$99",
                    "description": "Immersive surround sound",
                    "specs": "7.1 surround, noise canceling mic",
                },
            ],
        },
        "mobile": {
            "category": "Mobile Gaming",
            "products": [
                {
                    "name": "Gaming Phone Controller",
                    "price": "$59",
                    "description": "Console-style mobile gaming",
                    "specs": "Bluetooth, universal compatibility",
                },
                {
                    "name": "Mobile Gaming Trigger",
                    "price": "$29",
                    "description": "Enhanced mobile gaming control",
                    "specs": "L1/R1 triggers, adjustable",
                },
            ],
        },
    })
}

fn current_deals() -> serde_json::Value {
    serde_json::json!({
        "featured_deal": {
            "title": "Gaming Setup Bundle",
            "original_price": "$1,299",
            "sale_price": "$899",
            "savings": "$400",
            "discount_percentage": "31%",
            "description": "Complete RGB gaming setup including monitor, keyboard, mouse, and headset",
            "time_remaining": "Limited time offer",
            "items_included": [
                "27\" 144Hz Gaming Monitor",
                "RGB Mechanical Keyboard",
                "Gaming Mouse with RGB",
                "Gaming Headset 7.1",
                "RGB Mouse Pad",
            ],
        },
        "flash_deals": [
            {
                "item": "Gaming Mouse Pro",
                "original_price": "$69.99",
                "sale_price": "$49.99",
                "discount": "30% OFF",
            },
            {
                "item": "Mechanical Keyboard RGB",
                "original_price": "$119.99",
                "sale_price": "$89.99",
                "discount": "25% OFF",
            },
            {
                "item": "Gaming Headset",
                "original_price": "$129.99",
                "sale_price": "$79.99",
                "discount": "40% OFF",
            },
        ],
        "weekly_deals": [
            "Up to 20% off all RTX 4000 series",
            "Bundle discounts on complete PC builds",
            "Free shipping on orders over $100",
        ],
    })
}

fn recommendations() -> serde_json::Value {
    serde_json::json!({
        "budget_builds": {
            "entry_level": {
                "budget": "Under $800",
                "recommended": [
                    "AMD Ryzen 5 5600G - $159",
                    "16GB DDR4 RAM - $60",
                    "GTX 1660 Super - $230",
                    "B450 Motherboard - $80",
                    "500W PSU - $60",
                ],
                "total": "~$589",
            },
            "mid_range": {
                "budget": "$800-$1500",
                "recommended": [
                    "AMD Ryzen 7 5700X - $199",
                    "RTX 4060 Ti - $399",
                    "32GB DDR4 RAM - $120",
                    "B550 Motherboard - $120",
                    "650W Gold PSU - $90",
                ],
                "total": "~$928",
            },
            "high_end": {
                "budget": "$1500+",
                "recommended": [
                    "Intel Core i7-13700K - $409",
                    "RTX 4080 - $1199",
                    "32GB DDR5 RAM - $299",
                    "Z790 Motherboard - $199",
                    "850W Gold PSU - $150",
                ],
                "total": "~$2256",
            },
        },
        "gaming_preferences": {
            "competitive_fps": [
                "High refresh rate monitor",
                "Gaming mouse with high DPI",
                "Mechanical keyboard",
            ],
            "content_creation": [
                "RTX 4070+ for streaming",
                "32GB+ RAM",
                "Fast NVMe SSD",
            ],
            "vr_gaming": [
                "RTX 4070 minimum",
                "Intel i5-12600K+",
                "16GB RAM minimum",
            ],
        },
    })
}

fn setups() -> serde_json::Value {
    serde_json::json!({
        "budget_setup": {
            "total_budget": "$600-$800",
            "components": {
                "cpu": "AMD Ryzen 5 5600G - $159",
                "gpu": "GTX 1660 Super - $230",
                "ram": "16GB DDR4 - $60",
                "storage": "500GB NVMe SSD - $45",
                "motherboard": "B450M - $80",
                "psu": "500W Bronze - $60",
                "case": "Mid-tower ATX - $50",
            },
            "peripherals": {
                "monitor": "24\" 1080p 75Hz - $120",
                "keyboard": "Membrane Gaming Keyboard - $30",
                "mouse": "Gaming Mouse - $25",
                "headset": "Basic Gaming Headset - $35",
            },
            "total": "~$894",
        },
        "premium_setup": {
            "total_budget": "$2000-$3000",
            "components": {
                "cpu": "Intel i7-13700K - $409",
                "gpu": "RTX 4080 - $1199",
                "ram": "32GB DDR5 - $299",
                "storage": "1TB NVMe Gen4 - $120",
                "motherboard": "Z790 ATX - $199",
                "psu": "850W Gold - $150",
                "case": "Premium ATX RGB - $120",
            },
            "peripherals": {
                "monitor": "27\" 1440p 165Hz - $299",
                "keyboard": "Premium Mechanical RGB - $150",
                "mouse": "Pro Gaming Mouse - $80",
                "headset": "Premium Gaming Headset - $120",
            },
            "total": "~$3145",
        },
    })
}

fn store_info() -> serde_json::Value {
    serde_json::json!({
        "store_name": "GameZone",
        "tagline": "Level Up Your Gaming",
        "contact": {
            "phone": "+1 (555) 123-4567",
            "email": "info@gamezone.com",
            "address": "123 Gaming St, Tech City",
        },
        "specialties": [
            "PC Gaming Components",
            "Gaming Consoles & Accessories",
            "Gaming Peripherals",
            "Mobile Gaming Gear",
            "Custom PC Builds",
        ],
        "services": [
            "Custom PC Building",
            "Component Installation",
            "Gaming Setup Consultation",
            "Technical Support",
            "Product Recommendations",
        ],
        "policies": {
            "shipping": "Free shipping on orders over $100",
            "returns": "30-day return policy",
            "warranty": "Extended warranty available",
            "support": "24/7 technical support",
        },
        "hours": {
            "monday_friday": "9:00 AM - 9:00 PM",
            "saturday": "10:00 AM - 8:00 PM",
            "sunday": "12:00 PM - 6:00 PM",
        },
    })
}
