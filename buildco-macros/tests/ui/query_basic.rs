use buildco_application::envelope::QueryEnvelope;
use buildco_application::query::{CachePolicy, Query};
use buildco_macros::query;
use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize)]
pub struct SiteDto {
    pub id: u64,
}

#[query(name = "ListSites", output = Vec<SiteDto>, ttl = 60)]
pub struct ListSites {
    pub region: Option<String>,
}

#[query(name = "GetSite", output = SiteDto)]
pub struct GetSite {
    pub id: u64,
}

#[query(name = "LiveStats", output = SiteDto, cache = false)]
pub struct LiveStats {}

fn main() {
    assert_eq!(ListSites::CACHE, CachePolicy::Ttl(60));
    assert_eq!(GetSite::CACHE, CachePolicy::Default);
    assert_eq!(LiveStats::CACHE, CachePolicy::Disabled);

    let q = ListSites {
        envelope: QueryEnvelope::default(),
        region: Some("north".to_string()),
    };
    // envelope 不参与序列化
    let json = serde_json::to_string(&q).unwrap();
    assert_eq!(json, r#"{"region":"north"}"#);
    let _ = q.envelope().id();
    let _ = format!("{:?}", q);
}
