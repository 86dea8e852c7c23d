use signet_codec::{Map, Message};
use signet_example::{Address, Person, Role};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let mut person = Person::new();
    person.set_name("ada".to_string())?;
    person.set_age(36)?;
    person.role = Role::Admin;
    person.home = Some(Box::new(Address {
        street: "12 Analytical Row".to_string(),
        city:   "London".to_string(),
    }));
    person.scores = Map::from_iter([("maths".to_string(), 99.5)]);

    let bytes = person.encode_to_vec();
    println!("{} ({}) encodes to {} bytes", person.get_name(), person.role.name(), bytes.len());
    println!("{}", signet::decode_to_json(&bytes)?);

    let mut decoded = Person::default();
    decoded.decode(&bytes)?;
    assert_eq!(decoded, person);
    println!("round trip ok");
    Ok(())
}
