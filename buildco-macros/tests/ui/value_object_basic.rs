use buildco_macros::value_object;

#[value_object]
pub struct SiteCode(String);

#[value_object(debug = false)]
pub struct Secret(u32);

#[value_object]
pub enum Crew {
    Framing,
    Electrical,
}

fn main() {
    let code = SiteCode("N-01".to_string());
    assert_eq!(code.value(), "N-01");
    let copy = code.clone();
    assert!(copy == code);
    assert_eq!(code.into_inner(), "N-01".to_string());

    let _ = format!("{:?}", Crew::Framing);
    assert!(Crew::Electrical != Crew::Framing);
    assert_eq!(Secret(3).into_inner(), 3);
}
