use hickory_proto::rr::RecordType as HickoryRecordType;
use localdns_domain::RecordType;

pub struct RecordTypeMapper;

impl RecordTypeMapper {
    /// Convert hickory RecordType → domain RecordType; `None` for every type
    /// outside the cacheable subset.
    pub fn from_hickory(record_type: HickoryRecordType) -> Option<RecordType> {
        match record_type {
            HickoryRecordType::A => Some(RecordType::A),
            HickoryRecordType::AAAA => Some(RecordType::AAAA),
            _ => None,
        }
    }
}
