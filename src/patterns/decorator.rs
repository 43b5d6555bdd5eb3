//! Decorator pattern: café drinks wrapped in priced extras.

use crate::money::Amount;
use std::fmt;

pub trait Drink: Send + Sync {
    fn description(&self) -> String;

    fn cost(&self) -> Amount;
}

/// Base drinks on the menu.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BaseDrink {
    Espresso,
    Tea,
    Latte,
    Mocha,
    Americano,
}

impl Drink for BaseDrink {
    fn description(&self) -> String {
        match self {
            Self::Espresso => "espresso",
            Self::Tea => "tea",
            Self::Latte => "latte",
            Self::Mocha => "mocha",
            Self::Americano => "americano",
        }
        .to_string()
    }

    fn cost(&self) -> Amount {
        Amount::from_units(match self {
            Self::Espresso => 120,
            Self::Tea => 80,
            Self::Latte => 150,
            Self::Mocha => 160,
            Self::Americano => 100,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Extra {
    Milk,
    Sugar,
    WhippedCream,
    Syrup(String),
    Ice,
    Cinnamon,
    Lemon,
}

impl Extra {
    pub fn price(&self) -> Amount {
        Amount::from_units(match self {
            Self::Milk => 30,
            Self::Sugar => 10,
            Self::WhippedCream => 40,
            Self::Syrup(_) => 25,
            Self::Ice | Self::Lemon => 15,
            Self::Cinnamon => 20,
        })
    }
}

impl fmt::Display for Extra {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Milk => f.write_str("milk"),
            Self::Sugar => f.write_str("sugar"),
            Self::WhippedCream => f.write_str("whipped cream"),
            Self::Syrup(flavor) => write!(f, "{flavor} syrup"),
            Self::Ice => f.write_str("ice"),
            Self::Cinnamon => f.write_str("cinnamon"),
            Self::Lemon => f.write_str("lemon"),
        }
    }
}

/// One extra layered over any drink.
pub struct WithExtra {
    inner: Box<dyn Drink>,
    extra: Extra,
}

impl WithExtra {
    pub fn new(inner: Box<dyn Drink>, extra: Extra) -> Self {
        Self { inner, extra }
    }
}

impl Drink for WithExtra {
    fn description(&self) -> String {
        format!("{}, {}", self.inner.description(), self.extra)
    }

    fn cost(&self) -> Amount {
        self.inner.cost() + self.extra.price()
    }
}

/// Fluent order: each call wraps the drink built so far.
pub struct DrinkOrder {
    drink: Box<dyn Drink>,
}

impl DrinkOrder {
    pub fn new(base: BaseDrink) -> Self {
        Self {
            drink: Box::new(base),
        }
    }

    pub fn with(self, extra: Extra) -> Self {
        Self {
            drink: Box::new(WithExtra::new(self.drink, extra)),
        }
    }

    pub fn milk(self) -> Self {
        self.with(Extra::Milk)
    }

    pub fn sugar(self) -> Self {
        self.with(Extra::Sugar)
    }

    pub fn whipped_cream(self) -> Self {
        self.with(Extra::WhippedCream)
    }

    pub fn syrup(self, flavor: &str) -> Self {
        self.with(Extra::Syrup(flavor.trim().to_string()))
    }

    pub fn ice(self) -> Self {
        self.with(Extra::Ice)
    }

    pub fn cinnamon(self) -> Self {
        self.with(Extra::Cinnamon)
    }

    pub fn lemon(self) -> Self {
        self.with(Extra::Lemon)
    }

    pub fn build(self) -> Box<dyn Drink> {
        self.drink
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extras_stack_in_order() {
        let drink = DrinkOrder::new(BaseDrink::Espresso).milk().sugar().cinnamon().build();
        assert_eq!(drink.description(), "espresso, milk, sugar, cinnamon");
        assert_eq!(drink.cost(), Amount::from_units(180));
    }

    #[test]
    fn repeated_extras_are_charged_each_time() {
        let drink = DrinkOrder::new(BaseDrink::Tea).sugar().sugar().lemon().build();
        assert_eq!(drink.description(), "tea, sugar, sugar, lemon");
        assert_eq!(drink.cost(), Amount::from_units(115));
    }

    #[test]
    fn syrup_names_its_flavor() {
        let drink = DrinkOrder::new(BaseDrink::Latte)
            .whipped_cream()
            .syrup("vanilla")
            .build();
        assert_eq!(drink.description(), "latte, whipped cream, vanilla syrup");
        assert_eq!(drink.cost(), Amount::from_units(215));
    }

    #[test]
    fn plain_drink_is_just_the_base() {
        let drink = DrinkOrder::new(BaseDrink::Americano).build();
        assert_eq!(drink.cost(), Amount::from_units(100));
    }
}
