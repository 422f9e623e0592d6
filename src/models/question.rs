use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// 一道题目
///
/// `page` 只用于选择题库文件，不会写入题库。
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    #[serde(default)]
    pub question: String,
    #[serde(default, deserialize_with = "deserialize_options")]
    pub options: Vec<String>,
    #[serde(default, serialize_with = "serialize_answer")]
    pub answer: Option<i64>,
    #[serde(default)]
    pub explain: String,

    #[serde(skip)]
    pub page: String,
}

impl Question {
    /// 题干
    pub fn text(&self) -> &str {
        &self.question
    }

    /// 正确选项的下标（未提供时为 None）
    pub fn answer(&self) -> Option<i64> {
        self.answer
    }

    /// 路由键
    pub fn page(&self) -> &str {
        &self.page
    }

    /// 答案是否指向一个存在的选项
    pub fn answer_in_range(&self) -> bool {
        match self.answer {
            Some(idx) => usize::try_from(idx).is_ok_and(|idx| idx < self.options.len()),
            None => false,
        }
    }
}

// 题库格式要求 answer 必须是整数，未提供时写 0
fn serialize_answer<S>(answer: &Option<i64>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_i64(answer.unwrap_or(0))
}

// 兼容旧题库中 "options": null 的写法
fn deserialize_options<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Vec<String>>::deserialize(deserializer)?.unwrap_or_default())
}
