//! Demo travel-planning tools backed by built-in sample data.
//!
//! | Tool | Parameters |
//! |------|------------|
//! | `get_weather_forecast` | city, days |
//! | `search_attractions_by_preference` | city, preferences, duration |
//! | `search_accommodation` | city, budget_per_night, duration |
//! | `search_transportation` | departure, destination, travel_date |
//! | `calculate_budget_breakdown` | total_budget, transportation_cost, accommodation_cost, attraction_cost |
//!
//! All data is simulated. Inputs that cannot be served (unknown city, no
//! route, bad numbers) are reported as tool failures.

use chrono::{Duration as ChronoDuration, Local, NaiveDate};
use std::fmt::Write as _;
use stepwise_domain::{
    DuplicateNameError, ParamType, Plan, PlanStep, ToolArgs, ToolDefinition, ToolDescriptor,
    ToolParameter, ToolRegistry,
};

const WEATHER: &[(&str, [&str; 7], (i64, i64))] = &[
    ("Beijing", ["sunny", "cloudy", "light rain", "overcast", "sunny", "cloudy", "sunny"], (18, 25)),
    ("Shanghai", ["cloudy", "light rain", "overcast", "sunny", "cloudy", "light rain", "sunny"], (22, 28)),
    ("Chengdu", ["overcast", "light rain", "cloudy", "light rain", "overcast", "sunny", "cloudy"], (20, 26)),
    ("Guangzhou", ["sunny", "thunderstorms", "sunny", "cloudy", "thunderstorms", "sunny", "cloudy"], (26, 32)),
    ("Hangzhou", ["cloudy", "sunny", "light rain", "sunny", "cloudy", "sunny", "overcast"], (21, 27)),
    ("Shenzhen", ["sunny", "thunderstorms", "cloudy", "sunny", "thunderstorms", "sunny", "cloudy"], (25, 31)),
];

struct Attraction {
    name: &'static str,
    visit: &'static str,
    price: i64,
    rating: f64,
    note: &'static str,
}

const fn attraction(
    name: &'static str,
    visit: &'static str,
    price: i64,
    rating: f64,
    note: &'static str,
) -> Attraction {
    Attraction {
        name,
        visit,
        price,
        rating,
        note,
    }
}

const ATTRACTIONS: &[(&str, &str, &[Attraction])] = &[
    ("Beijing", "history", &[
        attraction("Forbidden City", "half day", 60, 4.8, "Ming and Qing imperial palace"),
        attraction("Great Wall (Badaling)", "full day", 40, 4.7, "Best-known section of the wall"),
        attraction("Temple of Heaven", "3 hours", 15, 4.6, "Imperial altar for heaven worship"),
        attraction("Summer Palace", "half day", 30, 4.5, "Qing dynasty royal garden"),
        attraction("Lama Temple", "2 hours", 25, 4.4, "Tibetan Buddhist temple"),
    ]),
    ("Beijing", "modern", &[
        attraction("Sanlitun", "3 hours", 0, 4.3, "Shopping and nightlife district"),
        attraction("798 Art District", "4 hours", 0, 4.4, "Contemporary art hub"),
        attraction("Olympic Park", "half day", 0, 4.2, "Bird's Nest and Water Cube"),
    ]),
    ("Beijing", "nature", &[
        attraction("Fragrant Hills", "half day", 10, 4.3, "Autumn red leaves"),
        attraction("Beihai Park", "3 hours", 10, 4.2, "Imperial lake garden"),
    ]),
    ("Shanghai", "history", &[
        attraction("The Bund", "2 hours", 0, 4.8, "Colonial-era waterfront"),
        attraction("Yu Garden", "3 hours", 40, 4.5, "Classical Jiangnan garden"),
        attraction("Tianzifang", "3 hours", 0, 4.4, "Shikumen lane quarter"),
    ]),
    ("Shanghai", "modern", &[
        attraction("Oriental Pearl Tower", "2 hours", 220, 4.3, "City landmark"),
        attraction("Lujiazui", "half day", 0, 4.6, "Financial district skyline"),
        attraction("Xintiandi", "3 hours", 0, 4.4, "Dining and leisure quarter"),
    ]),
    ("Chengdu", "history", &[
        attraction("Wuhou Shrine", "3 hours", 60, 4.5, "Three Kingdoms heritage"),
        attraction("Jinli Street", "3 hours", 0, 4.4, "Western Sichuan folk street"),
        attraction("Du Fu Thatched Cottage", "2 hours", 60, 4.3, "Home of the poet Du Fu"),
    ]),
    ("Chengdu", "nature", &[
        attraction("Giant Panda Base", "half day", 55, 4.8, "Panda breeding research center"),
        attraction("Mount Qingcheng", "full day", 90, 4.6, "Taoist mountain"),
    ]),
    ("Chengdu", "modern", &[
        attraction("Kuanzhai Alley", "3 hours", 0, 4.5, "Slow-living old lanes"),
        attraction("Chunxi Road", "3 hours", 0, 4.2, "Shopping and food street"),
    ]),
];

struct Hotel {
    name: &'static str,
    kind: &'static str,
    price: i64,
    rating: f64,
    area: &'static str,
}

const fn hotel(name: &'static str, kind: &'static str, price: i64, rating: f64, area: &'static str) -> Hotel {
    Hotel {
        name,
        kind,
        price,
        rating,
        area,
    }
}

const HOTELS: &[(&str, &[Hotel])] = &[
    ("Beijing", &[
        hotel("Beijing Hotel", "five-star", 800, 4.7, "Wangfujing"),
        hotel("Hilton", "international chain", 600, 4.6, "Chaoyang"),
        hotel("Home Inn", "budget chain", 200, 4.2, "citywide"),
        hotel("7 Days Inn", "budget chain", 150, 4.0, "citywide"),
        hotel("Youth Hostel", "hostel", 80, 3.8, "city center"),
    ]),
    ("Shanghai", &[
        hotel("Peace Hotel", "heritage", 900, 4.8, "The Bund"),
        hotel("Marriott", "international chain", 700, 4.6, "Pudong"),
        hotel("Hanting", "mid-range chain", 250, 4.3, "citywide"),
        hotel("Jinjiang Inn", "budget chain", 180, 4.1, "citywide"),
    ]),
    ("Chengdu", &[
        hotel("Shangri-La", "five-star", 650, 4.7, "city center"),
        hotel("JI Hotel", "mid-range chain", 280, 4.4, "citywide"),
        hotel("Super 8", "budget chain", 160, 4.0, "citywide"),
    ]),
];

const ROUTES: &[(&str, &str, &[(&str, &str, i64, &str)])] = &[
    ("Beijing", "Shanghai", &[
        ("flight", "2 hours", 800, "several per hour"),
        ("high-speed rail", "4.5 hours", 550, "every 30 minutes"),
        ("regular train", "12 hours", 200, "3 per day"),
    ]),
    ("Shanghai", "Beijing", &[
        ("flight", "2.5 hours", 850, "several per hour"),
        ("high-speed rail", "4.5 hours", 550, "every 30 minutes"),
    ]),
    ("Beijing", "Chengdu", &[
        ("flight", "3 hours", 900, "10+ per day"),
        ("high-speed rail", "8 hours", 650, "6 per day"),
    ]),
    ("Chengdu", "Beijing", &[
        ("flight", "3 hours", 950, "10+ per day"),
        ("high-speed rail", "8 hours", 650, "6 per day"),
    ]),
];

fn positive(args: &ToolArgs, key: &str) -> Result<i64, String> {
    let value = args.require_i64(key)?;
    if value <= 0 {
        return Err(format!("'{}' must be positive, got {}", key, value));
    }
    Ok(value)
}

fn weather_forecast(args: &ToolArgs, today: NaiveDate) -> Result<String, String> {
    let city = args.require_str("city")?;
    let days = positive(args, "days")?;

    let Some((_, pattern, (low, high))) = WEATHER.iter().find(|(name, _, _)| *name == city) else {
        let supported = WEATHER.iter().map(|(name, _, _)| *name).collect::<Vec<_>>();
        return Err(format!(
            "no weather data for {}; supported cities: {}",
            city,
            supported.join(", ")
        ));
    };

    let mut out = format!("{}-day forecast for {}:\n", days, city);
    for i in 0..days.min(7) {
        let date = today + ChronoDuration::days(i);
        let label = if i == 0 {
            "today".to_string()
        } else {
            format!("+{}d", i)
        };
        let _ = writeln!(
            out,
            "  {} ({}): {}, {}-{}°C",
            label,
            date.format("%m-%d"),
            pattern[i as usize % pattern.len()],
            low + i,
            high + i
        );
    }
    out.push_str("\nNote: simulated data");
    Ok(out)
}

fn attractions_by_preference(args: &ToolArgs) -> Result<String, String> {
    let city = args.require_str("city")?;
    let preferences = args.require_str("preferences")?;
    let duration = positive(args, "duration")?;

    let categories: Vec<_> = ATTRACTIONS.iter().filter(|(c, _, _)| *c == city).collect();
    if categories.is_empty() {
        return Err(format!("no attraction data for {}", city));
    }

    let wanted: Vec<String> = preferences
        .split(',')
        .map(|p| p.trim().to_lowercase())
        .filter(|p| !p.is_empty())
        .collect();
    let mut matched: Vec<&Attraction> = categories
        .iter()
        .filter(|entry| wanted.iter().any(|w| w == entry.1))
        .flat_map(|(_, _, items)| items.iter())
        .collect();

    if matched.is_empty() {
        let available = categories.iter().map(|(_, c, _)| *c).collect::<Vec<_>>();
        return Err(format!(
            "no attractions matching '{}'; available preferences: {}",
            preferences,
            available.join(", ")
        ));
    }

    matched.sort_by(|a, b| b.rating.total_cmp(&a.rating));
    // three sights per day
    let per_trip = usize::try_from(duration).unwrap_or(usize::MAX).saturating_mul(3);
    let count = matched.len().min(per_trip);

    let mut out = format!(
        "Attractions in {} for {} days (preferences: {}):\n\n",
        city, duration, preferences
    );
    let mut total_cost = 0;
    for (i, a) in matched.iter().take(count).enumerate() {
        let _ = writeln!(out, "{}. {} ({})", i + 1, a.name, a.rating);
        let _ = writeln!(out, "   visit: {} | ticket: ¥{}", a.visit, a.price);
        let _ = writeln!(out, "   {}\n", a.note);
        total_cost += a.price;
    }
    let _ = writeln!(out, "Estimated ticket total: ¥{}", total_cost);
    out.push_str("Note: simulated data");
    Ok(out)
}

fn accommodation(args: &ToolArgs) -> Result<String, String> {
    let city = args.require_str("city")?;
    let budget = positive(args, "budget_per_night")?;
    let nights = positive(args, "duration")?;

    let Some((_, hotels)) = HOTELS.iter().find(|(c, _)| *c == city) else {
        return Err(format!("no accommodation data for {}", city));
    };

    let mut suitable: Vec<&Hotel> = hotels.iter().filter(|h| h.price <= budget).collect();
    if suitable.is_empty() {
        let cheapest = hotels.iter().map(|h| h.price).min().unwrap_or_default();
        return Ok(format!(
            "No stays in {} within ¥{}/night; the cheapest is ¥{}/night",
            city, budget, cheapest
        ));
    }
    suitable.sort_by(|a, b| b.rating.total_cmp(&a.rating));

    let mut out = format!(
        "Stays in {} (budget ¥{}/night, {} nights):\n\n",
        city, budget, nights
    );
    for (i, h) in suitable.iter().take(5).enumerate() {
        let stay = h
            .price
            .checked_mul(nights)
            .ok_or_else(|| format!("cannot price a stay of {} nights", nights))?;
        let _ = writeln!(out, "{}. {} ({}) {}", i + 1, h.name, h.kind, h.rating);
        let _ = writeln!(out, "   ¥{}/night x {} = ¥{}", h.price, nights, stay);
        let _ = writeln!(out, "   area: {}\n", h.area);
    }
    out.push_str("Note: simulated data");
    Ok(out)
}

fn transportation(args: &ToolArgs) -> Result<String, String> {
    let departure = args.require_str("departure")?;
    let destination = args.require_str("destination")?;
    let travel_date = args.require_str("travel_date")?;

    let Some((_, _, options)) = ROUTES
        .iter()
        .find(|(from, to, _)| *from == departure && *to == destination)
    else {
        return Err(format!(
            "no transportation data from {} to {}",
            departure, destination
        ));
    };

    let mut out = format!("{} -> {} on {}:\n\n", departure, destination, travel_date);
    for (mode, time, price, frequency) in options.iter() {
        let _ = writeln!(out, "[{}]", mode);
        let _ = writeln!(out, "  duration: {}", time);
        let _ = writeln!(out, "  price: ¥{}", price);
        let _ = writeln!(out, "  frequency: {}\n", frequency);
    }
    out.push_str("Note: simulated data");
    Ok(out)
}

fn budget_breakdown(args: &ToolArgs) -> Result<String, String> {
    let total = positive(args, "total_budget")?;
    let transport = args.require_i64("transportation_cost")?;
    let lodging = args.require_i64("accommodation_cost")?;
    let tickets = args.require_i64("attraction_cost")?;

    let pct = |part: i64| part as f64 / total as f64 * 100.0;
    let overflow = || "planned costs are too large to add up".to_string();
    let used = transport
        .checked_add(lodging)
        .and_then(|sum| sum.checked_add(tickets))
        .ok_or_else(overflow)?;
    let remaining = total.checked_sub(used).ok_or_else(overflow)?;

    let mut out = format!("Budget breakdown (total ¥{}):\n\n", total);
    out.push_str("[Planned]\n");
    let _ = writeln!(out, "  transportation: ¥{} ({:.1}%)", transport, pct(transport));
    let _ = writeln!(out, "  accommodation: ¥{} ({:.1}%)", lodging, pct(lodging));
    let _ = writeln!(out, "  attractions: ¥{} ({:.1}%)", tickets, pct(tickets));
    let _ = writeln!(out, "  subtotal: ¥{} ({:.1}%)\n", used, pct(used));

    if remaining > 0 {
        let _ = writeln!(out, "[Remaining] ¥{} ({:.1}%)", remaining, pct(remaining));
        let _ = writeln!(out, "  food: ¥{:.0}", remaining as f64 * 0.6);
        let _ = writeln!(out, "  shopping and leisure: ¥{:.0}\n", remaining as f64 * 0.4);
        out.push_str("The budget covers a comfortable trip.");
    } else if remaining == 0 {
        out.push_str("The budget is fully allocated; consider keeping a reserve.");
    } else {
        let _ = write!(
            out,
            "Over budget by ¥{}; adjust the itinerary or raise the budget.",
            -remaining
        );
    }
    Ok(out)
}

fn string_param(name: &str, description: &str) -> ToolParameter {
    ToolParameter::new(name, ParamType::String, description)
}

fn integer_param(name: &str, description: &str) -> ToolParameter {
    ToolParameter::new(name, ParamType::Integer, description)
}

/// Descriptors for every travel tool, in catalog order
pub fn travel_tools() -> Vec<ToolDescriptor> {
    vec![
        ToolDescriptor::from_fn(
            ToolDefinition::new(
                "get_weather_forecast",
                "Weather forecast for a city over the next few days (up to 7)",
            )
            .with_parameter(string_param("city", "City name, e.g. Beijing"))
            .with_parameter(integer_param("days", "Number of days, e.g. 3")),
            |args| weather_forecast(args, Local::now().date_naive()),
        ),
        ToolDescriptor::from_fn(
            ToolDefinition::new(
                "search_attractions_by_preference",
                "Recommend attractions in a city matching travel preferences",
            )
            .with_parameter(string_param("city", "City name"))
            .with_parameter(string_param(
                "preferences",
                "Comma-separated preferences: history, modern, nature",
            ))
            .with_parameter(integer_param("duration", "Days in the city")),
            attractions_by_preference,
        ),
        ToolDescriptor::from_fn(
            ToolDefinition::new(
                "search_accommodation",
                "Find places to stay within a nightly budget",
            )
            .with_parameter(string_param("city", "City name"))
            .with_parameter(integer_param("budget_per_night", "Budget per night in CNY, e.g. 300"))
            .with_parameter(integer_param("duration", "Number of nights")),
            accommodation,
        ),
        ToolDescriptor::from_fn(
            ToolDefinition::new(
                "search_transportation",
                "Transportation options between two cities",
            )
            .with_parameter(string_param("departure", "Departure city"))
            .with_parameter(string_param("destination", "Destination city"))
            .with_parameter(string_param("travel_date", "Travel date, e.g. 2024-03-15")),
            transportation,
        ),
        ToolDescriptor::from_fn(
            ToolDefinition::new(
                "calculate_budget_breakdown",
                "Split a total budget into planned and remaining spending",
            )
            .with_parameter(integer_param("total_budget", "Total budget in CNY"))
            .with_parameter(integer_param("transportation_cost", "Transportation cost"))
            .with_parameter(integer_param("accommodation_cost", "Accommodation cost"))
            .with_parameter(integer_param("attraction_cost", "Attraction ticket cost")),
            budget_breakdown,
        ),
    ]
}

/// Registry holding the travel tools
pub fn travel_registry() -> Result<ToolRegistry, DuplicateNameError> {
    travel_tools()
        .into_iter()
        .try_fold(ToolRegistry::new(), ToolRegistry::with_tool)
}

/// Plan run when planning fails and the default-plan fallback is enabled
/// without configured steps: three days in Beijing.
pub fn default_plan() -> Plan {
    Plan::new("")
        .with_parameter("destination", "Beijing")
        .with_parameter("duration", "3")
        .with_parameter("budget", "5000")
        .with_parameter("preferences", "history")
        .with_step(
            PlanStep::new("Get weather", "get_weather_forecast")
                .with_param("city", "Beijing")
                .with_param("days", "3")
                .with_description("Check the weather at the destination"),
        )
        .with_step(
            PlanStep::new("Find attractions", "search_attractions_by_preference")
                .with_param("city", "Beijing")
                .with_param("preferences", "history")
                .with_param("duration", "3")
                .with_description("Recommend sights matching the preferences"),
        )
        .with_step(
            PlanStep::new("Find accommodation", "search_accommodation")
                .with_param("city", "Beijing")
                .with_param("budget_per_night", "300")
                .with_param("duration", "2")
                .with_description("Search for places to stay"),
        )
}
