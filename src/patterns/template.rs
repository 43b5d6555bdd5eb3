//! Template method: one fixed recipe, drinks fill in the steps.
//!
//! [`Beverage::prepare`] fixes the order; implementors supply `brew` and
//! `add_condiments` and may override the hooks. Customer choices come from a
//! [`Prompt`].

use crate::feedback::{Feedback, Prompt};

pub trait Beverage {
    fn name(&self) -> &str;

    fn brew(&mut self, out: &mut dyn Feedback);

    fn add_condiments(&mut self, out: &mut dyn Feedback);

    fn heat_water(&mut self, out: &mut dyn Feedback) {
        out.say("Boiling water");
    }

    fn pour(&mut self, out: &mut dyn Feedback) {
        out.say("Pouring into a cup");
    }

    fn wants_condiments(&mut self, _prompt: &mut dyn Prompt) -> bool {
        true
    }

    fn wants_extras(&mut self, _prompt: &mut dyn Prompt) -> bool {
        false
    }

    fn extras(&mut self, _out: &mut dyn Feedback, _prompt: &mut dyn Prompt) {}

    fn serve(&mut self, out: &mut dyn Feedback) {
        out.say("Serving");
    }

    /// The recipe. Implementors should not override this.
    fn prepare(&mut self, out: &mut dyn Feedback, prompt: &mut dyn Prompt) {
        out.say(&format!("=== Preparing {} ===", self.name()));
        self.heat_water(out);
        self.brew(out);
        self.pour(out);
        if self.wants_condiments(prompt) {
            self.add_condiments(out);
        }
        if self.wants_extras(prompt) {
            self.extras(out, prompt);
        }
        self.serve(out);
        out.say(&format!("=== {} is ready ===", self.name()));
        tracing::debug!(beverage = self.name(), "beverage prepared");
    }
}

#[derive(Debug, Default)]
pub struct Tea;

impl Beverage for Tea {
    fn name(&self) -> &str {
        "tea"
    }

    fn brew(&mut self, out: &mut dyn Feedback) {
        out.say("Steeping the tea leaves");
    }

    fn add_condiments(&mut self, out: &mut dyn Feedback) {
        out.say("Adding lemon");
    }

    fn wants_condiments(&mut self, prompt: &mut dyn Prompt) -> bool {
        prompt.confirm("Lemon in your tea?")
    }

    fn wants_extras(&mut self, prompt: &mut dyn Prompt) -> bool {
        prompt.confirm("Tea with mint?")
    }

    fn extras(&mut self, out: &mut dyn Feedback, _prompt: &mut dyn Prompt) {
        out.say("Adding fresh mint");
    }
}

#[derive(Debug, Default)]
pub struct Coffee {
    with_milk: bool,
}

impl Beverage for Coffee {
    fn name(&self) -> &str {
        "coffee"
    }

    fn brew(&mut self, out: &mut dyn Feedback) {
        out.say("Dripping coffee through the filter");
    }

    fn add_condiments(&mut self, out: &mut dyn Feedback) {
        out.say(if self.with_milk {
            "Adding milk and sugar"
        } else {
            "Adding sugar"
        });
    }

    /// Milk is only offered together with sugar.
    fn wants_condiments(&mut self, prompt: &mut dyn Prompt) -> bool {
        let sugar = prompt.confirm("Sugar in your coffee?");
        self.with_milk = sugar && prompt.confirm("Milk as well?");
        sugar
    }

    fn serve(&mut self, out: &mut dyn Feedback) {
        out.say(if self.with_milk {
            "Serving white coffee"
        } else {
            "Serving black coffee"
        });
    }
}

#[derive(Debug, Default)]
pub struct HotChocolate {
    marshmallows: bool,
    cinnamon: bool,
}

impl Beverage for HotChocolate {
    fn name(&self) -> &str {
        "hot chocolate"
    }

    fn brew(&mut self, out: &mut dyn Feedback) {
        out.say("Melting chocolate into hot milk");
    }

    fn add_condiments(&mut self, out: &mut dyn Feedback) {
        if self.marshmallows {
            out.say("Adding marshmallows");
        }
        if self.cinnamon {
            out.say("Dusting with cinnamon");
        }
    }

    fn wants_condiments(&mut self, prompt: &mut dyn Prompt) -> bool {
        self.marshmallows = prompt.confirm("Marshmallows?");
        self.cinnamon = prompt.confirm("Cinnamon?");
        self.marshmallows || self.cinnamon
    }

    fn serve(&mut self, out: &mut dyn Feedback) {
        out.say("Serving hot chocolate with foam");
    }
}

#[derive(Debug, Default)]
pub struct Espresso;

impl Beverage for Espresso {
    fn name(&self) -> &str {
        "espresso"
    }

    fn brew(&mut self, out: &mut dyn Feedback) {
        out.say("Pulling a shot under pressure");
    }

    fn add_condiments(&mut self, out: &mut dyn Feedback) {
        out.say("Adding a lemon slice and sugar");
    }

    fn wants_condiments(&mut self, prompt: &mut dyn Prompt) -> bool {
        prompt.confirm("Espresso is usually taken plain. Add condiments anyway?")
    }

    fn serve(&mut self, out: &mut dyn Feedback) {
        out.say("Serving in a demitasse");
    }
}

/// Cold drink: skips the kettle and always runs the extra steps.
#[derive(Debug, Default)]
pub struct Smoothie {
    fruits: Vec<String>,
}

impl Smoothie {
    /// An empty list falls back to banana and strawberry.
    pub fn with_fruits<I, S>(fruits: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            fruits: fruits
                .into_iter()
                .map(Into::into)
                .filter(|f: &String| !f.trim().is_empty())
                .collect(),
        }
    }

    pub fn fruits(&self) -> &[String] {
        &self.fruits
    }
}

impl Beverage for Smoothie {
    fn name(&self) -> &str {
        "fruit smoothie"
    }

    fn heat_water(&mut self, _out: &mut dyn Feedback) {}

    fn brew(&mut self, out: &mut dyn Feedback) {
        if self.fruits.is_empty() {
            self.fruits = vec!["banana".to_string(), "strawberry".to_string()];
            out.say("No fruit chosen, using banana and strawberry");
        }
        out.say("Blending:");
        for fruit in &self.fruits {
            out.say(&format!("  - {fruit}"));
        }
    }

    fn pour(&mut self, out: &mut dyn Feedback) {
        out.say("Pouring into a tall glass");
    }

    fn add_condiments(&mut self, out: &mut dyn Feedback) {
        out.say("Adding honey and yogurt");
    }

    fn wants_condiments(&mut self, prompt: &mut dyn Prompt) -> bool {
        prompt.confirm("Honey and yogurt?")
    }

    fn wants_extras(&mut self, _prompt: &mut dyn Prompt) -> bool {
        true
    }

    fn extras(&mut self, out: &mut dyn Feedback, prompt: &mut dyn Prompt) {
        if prompt.confirm("Ice?") {
            out.say("Adding ice cubes");
        }
    }

    fn serve(&mut self, out: &mut dyn Feedback) {
        out.say("Serving with a straw");
    }
}

/// Menu entry for `n` (1-based), as in the café menu.
pub fn menu_item(n: u32) -> Option<Box<dyn Beverage>> {
    match n {
        1 => Some(Box::new(Tea)),
        2 => Some(Box::new(Coffee::default())),
        3 => Some(Box::new(HotChocolate::default())),
        4 => Some(Box::new(Espresso)),
        5 => Some(Box::new(Smoothie::default())),
        _ => None,
    }
}
