use super::preprocess::strip_comments;
use crate::core::errors::ParseError;
use crate::core::fleet::TemplateSpec;
use crate::core::orders::Order;
use crate::core::places::{Buyer, Storage};
use crate::core::types::{PlaceId, Point};
use std::path::Path;
use std::str::{FromStr, SplitWhitespace};

/// Everything a simulation run is built from
#[derive(Debug, Clone, Default)]
pub struct Scenario {
    pub storages: Vec<Storage>,
    pub buyers: Vec<Buyer>,
    /// Undirected connections between place ids; self-loops already dropped
    pub edges: Vec<(PlaceId, PlaceId)>,
    pub templates: Vec<TemplateSpec>,
    /// Orders with customers resolved to place ids
    pub orders: Vec<Order>,
}

struct Tokens<'a> {
    inner: SplitWhitespace<'a>,
}

impl<'a> Tokens<'a> {
    fn new(text: &'a str) -> Self {
        Self {
            inner: text.split_whitespace(),
        }
    }

    fn word(&mut self, expected: &'static str) -> Result<&'a str, ParseError> {
        self.inner.next().ok_or(ParseError::UnexpectedEof { expected })
    }

    fn number<T: FromStr>(&mut self, expected: &'static str) -> Result<T, ParseError> {
        let token = self.word(expected)?;
        token.parse().map_err(|_| ParseError::InvalidNumber {
            token: token.to_string(),
            expected,
        })
    }

    fn count(&mut self, section: &'static str) -> Result<usize, ParseError> {
        self.number(section)
    }
}

impl Scenario {
    /// Parse scenario text. Comments are stripped first, then five counted
    /// sections are read in order: storages, buyers, edges, transports, orders.
    pub fn parse(text: &str) -> Result<Self, ParseError> {
        let cleaned = strip_comments(text)?;
        let mut tokens = Tokens::new(&cleaned);
        let mut scenario = Scenario::default();

        for _ in 0..tokens.count("storage count")? {
            let point = Point::new(tokens.number("storage x")?, tokens.number("storage y")?);
            let coal = tokens.number("storage coal")?;
            let time_to_generate = tokens.number("storage generation time")?;
            let time_to_load = tokens.number("storage loading time")?;
            scenario
                .storages
                .push(Storage::new(point, coal, time_to_generate, time_to_load));
        }

        for _ in 0..tokens.count("buyer count")? {
            let point = Point::new(tokens.number("buyer x")?, tokens.number("buyer y")?);
            scenario.buyers.push(Buyer::new(point));
        }

        let place_count = (scenario.storages.len() + scenario.buyers.len()) as u32;
        for _ in 0..tokens.count("edge count")? {
            let from: u32 = tokens.number("edge start")?;
            let to: u32 = tokens.number("edge end")?;
            for id in [from, to] {
                if id == 0 || id > place_count {
                    return Err(ParseError::UnknownPlace(id));
                }
            }
            if from != to {
                scenario.edges.push((PlaceId(from), PlaceId(to)));
            }
        }

        for _ in 0..tokens.count("transport count")? {
            scenario.templates.push(TemplateSpec {
                name: tokens.word("transport name")?.to_string(),
                speed_min: tokens.number("minimum speed")?,
                speed_max: tokens.number("maximum speed")?,
                distance_min: tokens.number("minimum distance")?,
                distance_max: tokens.number("maximum distance")?,
                time_to_repair: tokens.number("repair time")?,
                max_capacity: tokens.number("transport capacity")?,
                spawn_weight: tokens.number("spawn weight")?,
            });
        }

        let storage_count = scenario.storages.len() as u32;
        for _ in 0..tokens.count("order count")? {
            let created_at = tokens.number("order time")?;
            let customer: u32 = tokens.number("order customer")?;
            let coal = tokens.number("order coal")?;
            let deadline_offset = tokens.number("order deadline")?;
            if customer == 0 || customer as usize > scenario.buyers.len() {
                return Err(ParseError::UnknownCustomer(customer));
            }
            let customer = PlaceId(storage_count + customer);
            scenario
                .orders
                .push(Order::new(created_at, customer, coal, deadline_offset));
        }

        Ok(scenario)
    }

    /// Read and parse a scenario file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ParseError> {
        let text = std::fs::read_to_string(path)?;
        Self::parse(&text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "\
❄ storages: x y coal generate load ⛏
2
0 0 50 10 0.5
100 0 50 10 0.5
❄ buyers ❄nested⛏ ⛏
1
10 0
❄ edges ⛏
3
1 3
2 3
3 3
❄ transports ⛏
1
cart 2 2 100 200 5 20 1.0
❄ orders: time customer coal deadline ⛏
1
4.5 1 7 100
";

    #[test]
    fn test_parse_sample() {
        let scenario = Scenario::parse(SAMPLE).unwrap();
        assert_eq!(scenario.storages.len(), 2);
        assert_eq!(scenario.storages[1].point, Point::new(100.0, 0.0));
        assert_eq!(scenario.storages[0].time_to_load, 0.5);
        assert_eq!(scenario.buyers.len(), 1);
        // The self-loop 3-3 is dropped
        assert_eq!(scenario.edges, vec![(PlaceId(1), PlaceId(3)), (PlaceId(2), PlaceId(3))]);
        assert_eq!(scenario.templates[0].name, "cart");
        assert_eq!(scenario.templates[0].max_capacity, 20);

        let order = &scenario.orders[0];
        assert_eq!(order.customer(), PlaceId(3));
        assert_eq!(order.coal(), 7);
        assert_eq!(order.deadline(), 104.5);
    }

    #[test]
    fn test_truncated_input() {
        let err = Scenario::parse("1\n0 0 5").unwrap_err();
        assert!(matches!(err, ParseError::UnexpectedEof { expected: "storage generation time" }));
    }

    #[test]
    fn test_invalid_number() {
        let err = Scenario::parse("1\n0 zero 5 1 1").unwrap_err();
        assert!(matches!(err, ParseError::InvalidNumber { ref token, .. } if token == "zero"));
    }

    #[test]
    fn test_edge_to_unknown_place() {
        let err = Scenario::parse("1\n0 0 5 1 1\n1\n1 1\n1\n1 3\n").unwrap_err();
        assert!(matches!(err, ParseError::UnknownPlace(3)));
    }

    #[test]
    fn test_order_for_unknown_customer() {
        let text = "1\n0 0 5 1 1\n1\n1 1\n1\n1 2\n1\nc 1 1 1 1 1 1 1\n1\n0 2 1 1\n";
        assert!(matches!(Scenario::parse(text), Err(ParseError::UnknownCustomer(2))));
    }

    #[test]
    fn test_missing_file() {
        assert!(matches!(
            Scenario::from_file("/definitely/not/here.txt"),
            Err(ParseError::Io(_))
        ));
    }
}
