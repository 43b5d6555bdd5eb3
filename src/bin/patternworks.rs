//! Scripted demos for every machine and pattern in the crate.

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use patternworks::clock::ManualClock;
use patternworks::config::PatternworksConfig;
use patternworks::feedback::{Console, Feedback, ScriptedAnswers, Silent};
use patternworks::hotel::{DiscountTier, HotelBooking, RateTable};
use patternworks::money::Amount;
use patternworks::patterns::adapter::OnlineStore;
use patternworks::patterns::command::{
    Invoker, MacroCommand, SetBrightness, SetChannel, SetTemperature, SmartHome, ToggleDoor,
    ToggleLight, ToggleLock, ToggleTelevision,
};
use patternworks::patterns::composite::{demo_collection, GarageComponent};
use patternworks::patterns::decorator::{BaseDrink, DrinkOrder};
use patternworks::patterns::facade::HomeTheater;
use patternworks::patterns::mediator::{ChatRoom, Participant};
use patternworks::patterns::observer::{
    AnalyticsBoard, CurrencyExchange, EmailAlerts, EmailNotifier, MobileApp, RateUpdate,
    SoundAlarm, TradingBot, WeatherDisplay, WeatherStation,
};
use patternworks::patterns::strategy::{
    BankTransfer, CreditCard, Crypto, DeliveryContext, Parcel, PayPal, PaymentContext,
    PaymentStrategy, ShippingMethod,
};
use patternworks::patterns::template::menu_item;
use patternworks::request::{BookingRequest, RequestOptions};
use patternworks::roles::{Campus, Capability, Role};
use patternworks::ticket::{demo_script, parse_script, run_script, TicketMachineBuilder};
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "patternworks", version, about = "Design pattern simulations")]
struct Cli {
    /// TOML configuration file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Demo,
}

#[derive(Subcommand)]
enum Demo {
    /// Ticket vending machine
    Ticket {
        /// Script with one command per line
        #[arg(long)]
        script: Option<PathBuf>,
    },
    /// Hotel room booking
    Hotel,
    /// Booking request with a payment deadline
    Request,
    /// Learning platform roles
    Roles,
    /// Async currency exchange observers
    Exchange,
    /// Weather station observers
    Weather,
    /// Chat room mediator
    Chat,
    /// Smart-home remote with undo and redo
    SmartHome,
    /// Coffee shop decorators
    Cafe,
    /// Beverage template method
    Beverages {
        /// Answer every customer question with yes
        #[arg(long)]
        yes: bool,
    },
    /// Shipping cost strategies
    Shipping {
        #[arg(long, default_value = "10")]
        weight: Amount,
        #[arg(long, default_value = "250")]
        distance: Amount,
    },
    /// Payment strategies and processor adapters
    Checkout,
    /// Garage composite
    Garage,
    /// Home theater facade
    Theater,
    /// Print a machine's transition history as JSON
    History {
        #[arg(value_enum, default_value_t = Machine::Ticket)]
        machine: Machine,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum Machine {
    Ticket,
    Hotel,
    Request,
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => PatternworksConfig::load(path)
            .with_context(|| format!("loading {}", path.display()))?,
        None => PatternworksConfig::default(),
    };

    match cli.command {
        Demo::Ticket { script } => ticket(&config, script),
        Demo::Hotel => hotel(&config),
        Demo::Request => request(&config),
        Demo::Roles => roles(),
        Demo::Exchange => exchange(),
        Demo::Weather => weather(),
        Demo::Chat => chat(),
        Demo::SmartHome => smart_home(),
        Demo::Cafe => cafe(),
        Demo::Beverages { yes } => beverages(yes),
        Demo::Shipping { weight, distance } => shipping(weight, distance),
        Demo::Checkout => checkout(),
        Demo::Garage => garage(),
        Demo::Theater => theater(),
        Demo::History { machine } => history(&config, machine),
    }
}

fn banner(out: &mut dyn Feedback, title: &str) {
    out.say("");
    out.say(&format!("=== {title} ==="));
}

fn ticket(config: &PatternworksConfig, script: Option<PathBuf>) -> Result<()> {
    let commands = match script {
        Some(path) => {
            let text = std::fs::read_to_string(&path)
                .with_context(|| format!("reading {}", path.display()))?;
            parse_script(&text).with_context(|| format!("parsing {}", path.display()))?
        }
        None => demo_script(),
    };

    let mut machine = TicketMachineBuilder::from_config(&config.ticket).build(Console)?;
    let refused = run_script(&mut machine, &commands);

    let mut out = Console;
    banner(&mut out, "Sales");
    for sale in machine.sales() {
        out.say(&format!("{} for {} (change {})", sale.code, sale.price, sale.change));
    }
    for ticket in machine.catalog() {
        out.say(&format!("{}: {} left", ticket.name, machine.remaining(&ticket.code)));
    }
    if refused > 0 {
        out.say(&format!("{refused} command(s) refused"));
    }
    Ok(())
}

fn hotel_session<F: Feedback>(config: &PatternworksConfig, out: F) -> Result<HotelBooking<F>> {
    let rates = Arc::new(RateTable::from_config(&config.hotel));
    let mut booking = HotelBooking::new(rates, out);
    booking.select_room("101")?;
    booking.change_room("205")?;
    booking.confirm()?;
    booking.apply_discount(DiscountTier::Regular)?;
    let due = booking.details().amount_due();
    booking.pay(due + Amount::from_units(100))?;
    Ok(booking)
}

fn hotel(config: &PatternworksConfig) -> Result<()> {
    let booking = hotel_session(config, Console)?;
    let mut out = Console;
    banner(&mut out, "Booking");
    for line in booking.summary() {
        out.say(&line);
    }
    for line in booking.journal().lines() {
        out.say(&line);
    }
    Ok(())
}

fn request(config: &PatternworksConfig) -> Result<()> {
    let clock = Arc::new(ManualClock::starting_now());
    let options = RequestOptions {
        window: config.booking.payment_window(),
        clock: clock.clone(),
        ..RequestOptions::default()
    };
    let mut out = Console;

    banner(&mut out, "Paid in time");
    let mut on_time = BookingRequest::new("Emil", Amount::from_units(2500), options.clone(), Console)?;
    on_time.send_to_client()?;
    clock.advance(chrono::Duration::minutes(2));
    out.say(&on_time.deadline_status());
    on_time.pay()?;
    on_time.confirm()?;

    banner(&mut out, "Paid too late");
    let mut late = BookingRequest::new("Ali", Amount::from_units(1800), options, Console)?;
    late.send_to_client()?;
    clock.advance(config.booking.payment_window() + chrono::Duration::seconds(1));
    out.say(&late.deadline_status());
    late.pay()?;
    out.say(&format!("Request {} is now {}", late.id(), late.stage()));
    Ok(())
}

fn roles() -> Result<()> {
    let mut out = Console;
    let mut campus = Campus::new();
    let admin = campus.register("Admin", "admin@campus.test", Role::Administrator)?;
    let teacher = campus.create_user(&admin, "Dana", "dana@campus.test", Role::Teacher)?;
    let student = campus.create_user(&admin, "Emil", "emil@campus.test", Role::Student)?;

    campus.create_category(&admin, "Programming", "Software development")?;
    let course = campus.create_course(&teacher, "Rust basics", "Ownership and borrowing", "Programming")?;
    campus.add_material(&teacher, &course, "Intro", "video")?;
    campus.create_test(&teacher, &course, "Quiz 1", 100)?;

    campus.enroll(&student, &course)?;
    campus.update_progress(&student, &course, 60)?;
    campus.take_test(&student, &course, 85)?;
    let review = campus.write_review(&student, &course, 5, "Clear and practical")?;
    campus.moderate_review(&admin, &review, true)?;

    banner(&mut out, "Permissions");
    for role in Role::ALL {
        out.say(&format!("{role}: {} capabilities", role.permissions().len()));
    }
    if let Err(error) = campus.create_course(&student, "Nope", "-", "Programming") {
        out.say(&format!("Student creating a course: {error}"));
    }

    banner(&mut out, "Statistics");
    let stats = campus.course_statistics(&teacher, &course)?;
    out.say(&format!(
        "{}: {} enrolled, progress {:.1}%, rating {:?}",
        stats.course_id, stats.enrolled, stats.average_progress, stats.average_rating
    ));

    campus.block_user(&admin, &student)?;
    if let Err(error) = campus.authorize(&student, Capability::BrowseCourses) {
        out.say(&format!("Blocked student browsing: {error}"));
    }
    let analytics = campus.analytics(&admin)?;
    out.say(&format!(
        "{} courses, {} reviews, {} blocked",
        analytics.courses, analytics.reviews, analytics.blocked_members
    ));
    Ok(())
}

fn exchange() -> Result<()> {
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("starting async runtime")?;
    runtime.block_on(async {
        let mut out = Console;
        let mut exchange = CurrencyExchange::with_default_rates("Central");
        exchange.register(Arc::new(MobileApp::new("Rates")));
        exchange.register(Arc::new(EmailAlerts::new("trader@example.com")));
        exchange.register(Arc::new(TradingBot::new("alpha")));
        exchange.register(Arc::new(AnalyticsBoard::new("desk")));

        let updates = [
            ("USD/RUB", "94.8"),
            ("EUR/RUB", "97.5"),
            ("USD/EUR", "0.93"),
            ("JPY/RUB", "0.62"),
        ];
        for (pair, rate) in updates {
            let rate: Amount = rate.parse()?;
            match exchange.update_rate(pair, rate).await? {
                RateUpdate::Added => out.say(&format!("{pair}: new pair at {rate:.4}")),
                RateUpdate::Unchanged => out.say(&format!("{pair}: unchanged")),
                RateUpdate::Changed { change, notifications } => {
                    out.say(&change.to_string());
                    for line in notifications {
                        out.say(&format!("  {line}"));
                    }
                }
            }
        }
        Ok::<(), anyhow::Error>(())
    })
}

fn weather() -> Result<()> {
    let mut out = Console;
    let mut station = WeatherStation::new();
    station.register(Box::new(WeatherDisplay::new("lobby")), &mut out);
    station.register(Box::new(EmailNotifier::new("ops@example.com")), &mut out);
    station.register(Box::new(SoundAlarm::new()), &mut out);

    for celsius in [21.5, 36.0, -25.0] {
        station.set_temperature(celsius, &mut out)?;
    }
    station.remove("ops@example.com", &mut out)?;
    if let Err(error) = station.set_temperature(150.0, &mut out) {
        out.say(&format!("Rejected: {error}"));
    }
    Ok(())
}

fn chat() -> Result<()> {
    let mut out = Console;
    let mut room = ChatRoom::new("lobby");
    room.join(Participant::admin("Admin")?, &mut out)?;
    room.join(Participant::bot("Helper")?, &mut out)?;
    room.join(Participant::regular("Emil")?, &mut out)?;
    room.join(Participant::regular("Ali")?, &mut out)?;

    room.send("Emil", "hello everyone", &mut out)?;
    room.send_private("Ali", "Emil", "see you at six", &mut out)?;
    room.send("Ali", "what time is it", &mut out)?;
    room.announce("Admin", "Server restarts tonight", &mut out)?;
    room.kick("Admin", "Ali", &mut out)?;

    banner(&mut out, "Roster");
    for line in room.roster() {
        out.say(&line);
    }
    Ok(())
}

fn smart_home() -> Result<()> {
    let mut out = Console;
    let mut home = SmartHome::demo();
    let mut remote = Invoker::new();

    remote.execute(Box::new(ToggleLight::new("living room")), &mut home, &mut out)?;
    remote.execute(Box::new(SetBrightness::new("living room", 40)), &mut home, &mut out)?;
    if let Err(error) = remote.execute(Box::new(ToggleDoor::new("front")), &mut home, &mut out) {
        out.say(&format!("Refused: {error}"));
    }
    remote.execute(Box::new(ToggleLock::new("front")), &mut home, &mut out)?;
    remote.execute(Box::new(ToggleDoor::new("front")), &mut home, &mut out)?;

    let movie_night = MacroCommand::new("movie night")
        .then(SetBrightness::new("living room", 10))
        .then(SetTemperature::new("living room", 21.0))
        .then(ToggleTelevision::new("living room"))
        .then(SetChannel::new("living room", 42));
    remote.execute(Box::new(movie_night), &mut home, &mut out)?;

    let undone = remote.undo(&mut home, &mut out)?;
    out.say(&format!("Undone: {undone}"));
    let redone = remote.redo(&mut home, &mut out)?;
    out.say(&format!("Redone: {redone}"));

    banner(&mut out, "History");
    for entry in remote.history() {
        out.say(&entry);
    }
    banner(&mut out, "Devices");
    out.say(&home.to_string());
    Ok(())
}

fn cafe() -> Result<()> {
    let mut out = Console;
    let orders = [
        DrinkOrder::new(BaseDrink::Espresso).milk().sugar().build(),
        DrinkOrder::new(BaseDrink::Latte).syrup("vanilla").whipped_cream().build(),
        DrinkOrder::new(BaseDrink::Tea).lemon().build(),
        DrinkOrder::new(BaseDrink::Americano).ice().cinnamon().build(),
    ];
    let mut total = Amount::ZERO;
    for drink in &orders {
        out.say(&format!("{}: {}", drink.description(), drink.cost()));
        total += drink.cost();
    }
    out.say(&format!("Total: {total}"));
    Ok(())
}

fn beverages(yes: bool) -> Result<()> {
    let mut out = Console;
    let mut prompt = ScriptedAnswers::always(yes);
    for n in 1..=5 {
        if let Some(mut drink) = menu_item(n) {
            drink.prepare(&mut out, &mut prompt);
        }
    }
    Ok(())
}

fn shipping(weight: Amount, distance: Amount) -> Result<()> {
    let mut out = Console;
    let parcel = Parcel::new(weight, distance);
    let mut delivery = DeliveryContext::new();
    for method in ShippingMethod::ALL {
        delivery.set_strategy(method.strategy());
        let cost = delivery.cost(&parcel)?;
        out.say(&format!("{}: {cost}", delivery.method().unwrap_or("?")));
    }
    Ok(())
}

fn checkout() -> Result<()> {
    let mut out = Console;
    let amount = Amount::from_units(1250);

    banner(&mut out, "Payment strategies");
    let strategies: Vec<Box<dyn PaymentStrategy>> = vec![
        Box::new(CreditCard::new("4111 1111 1111 1111", "Emil M", "123", "12/27")?),
        Box::new(PayPal::new("emil@example.com", "secret1")?),
        Box::new(Crypto::btc("1A1zP1eP5QGefi2DMPTfTL5SLmv7DivfNa")?),
        Box::new(BankTransfer::new("KZ1234567890", "Kaspi", "Ali K")?),
    ];
    let mut context = PaymentContext::new();
    for strategy in strategies {
        context.set_strategy(strategy);
        out.say(&format!("Using {}", context.current_method()));
        if let Err(error) = context.execute(amount, &mut out) {
            out.say(&format!("Payment failed: {error}"));
        }
    }

    banner(&mut out, "Processor adapters");
    let store = OnlineStore::demo();
    for (index, name) in store.processors().iter().enumerate() {
        match store.process_order("Emil", amount, index, &mut out) {
            Ok(receipt) => out.say(&format!("{name}: {}", receipt.reference)),
            Err(error) => out.say(&format!("{name}: {error}")),
        }
    }
    Ok(())
}

fn garage() -> Result<()> {
    let mut out = Console;
    let collection = demo_collection();
    out.say(&collection.render());
    banner(&mut out, "Cars");
    for line in collection.car_list() {
        out.say(&line);
    }
    out.say(&format!("Emil owns {} car(s)", collection.cars_by_owner("Emil").len()));
    out.say(&format!("Total value: {}", collection.total_value()));
    Ok(())
}

fn theater() -> Result<()> {
    let mut out = Console;
    let mut emil = HomeTheater::new("Emil", "Block 3, house 15");
    emil.start_movie("Dead Man's Bluff", &["Burger", "Fries", "Canned cola"], &mut out);
    emil.end(&mut out);

    let mut ali = HomeTheater::new("Ali", "Block 5, house 22");
    ali.start_gaming("Need for Speed", &mut out);
    ali.end(&mut out);

    let mut amir = HomeTheater::new("Amir", "Block 1, house 8");
    amir.start_music("Best of 2024", &mut out);
    amir.end(&mut out);

    let mut dmitry = HomeTheater::new("Dmitry", "Block 4, house 33");
    dmitry.start_movie("Boomer 2", &["Pizza", "Canned cola"], &mut out);
    dmitry.emergency_shutdown(&mut out);
    Ok(())
}

fn history(config: &PatternworksConfig, machine: Machine) -> Result<()> {
    let json = match machine {
        Machine::Ticket => {
            let mut ticket = TicketMachineBuilder::from_config(&config.ticket).build(Silent)?;
            run_script(&mut ticket, &demo_script());
            serde_json::to_string_pretty(ticket.history())?
        }
        Machine::Hotel => serde_json::to_string_pretty(hotel_session(config, Silent)?.history())?,
        Machine::Request => {
            let mut request =
                BookingRequest::new("Emil", Amount::from_units(2500), RequestOptions::default(), Silent)?;
            request.send_to_client()?;
            request.pay()?;
            request.confirm()?;
            serde_json::to_string_pretty(request.history())?
        }
    };
    if json.is_empty() {
        bail!("no history recorded");
    }
    println!("{json}");
    Ok(())
}
