// Provider payloads, shaped like the live endpoints' answers.

use serde_json::{json, Value};

use crate::mock_transport::{MockTransport, FORM, HTML};

pub const ACCESS_TOKEN: &str = "ACCESS_TOKEN_0123";
pub const QQ_OPENID: &str = "8E2A5B0C66F14D43A1B0C4D0A2F6E2F1";
pub const WECHAT_OPENID: &str = "oVpt2wbJ3Tr2RqsXnB1l2hrS5cKo";
pub const WEIBO_UID: u64 = 1404376560;

/// QQ token endpoint: form-encoded body served as text/html.
pub fn qq_token_body() -> String {
    format!("access_token={ACCESS_TOKEN}&expires_in=7776000&refresh_token=REFRESH_0123")
}

/// QQ `oauth2.0/me`: JSON wrapped in `callback( ... );`.
pub fn qq_me_body(client_id: &str) -> String {
    format!(r#"callback( {{"client_id":"{client_id}","openid":"{QQ_OPENID}"}} );"#)
}

pub fn qq_user_info() -> Value {
    json!({
        "ret": 0,
        "msg": "",
        "nickname": "Peter",
        "gender": "男",
        "figureurl_qq_1": "http://q.qlogo.cn/qqapp/100312990/avatar/40"
    })
}

/// Script a successful QQ flow: token, `me`, `get_user_info`.
pub fn script_qq_flow(transport: &MockTransport, client_id: &str) {
    transport
        .push_text(HTML, qq_token_body())
        .push_text(HTML, qq_me_body(client_id))
        .push_json(qq_user_info());
}

pub fn wechat_token() -> Value {
    json!({
        "access_token": ACCESS_TOKEN,
        "expires_in": 7200,
        "refresh_token": "REFRESH_0123",
        "openid": WECHAT_OPENID,
        "scope": "snsapi_login",
        "unionid": "o6_bmasdasdsad6_2sgVt7hMZOPfL"
    })
}

pub fn wechat_user_info() -> Value {
    json!({
        "openid": WECHAT_OPENID,
        "nickname": "NICKNAME",
        "sex": 1,
        "province": "PROVINCE",
        "city": "CITY",
        "country": "COUNTRY",
        "headimgurl": "https://thirdwx.qlogo.cn/mmopen/0",
        "privilege": ["PRIVILEGE1", "PRIVILEGE2"],
        "unionid": "o6_bmasdasdsad6_2sgVt7hMZOPfL"
    })
}

/// Script a successful WeChat flow: token, `sns/userinfo`.
pub fn script_wechat_flow(transport: &MockTransport) {
    transport
        .push_json(wechat_token())
        .push_json(wechat_user_info());
}

pub fn weibo_token() -> Value {
    json!({
        "access_token": ACCESS_TOKEN,
        "remind_in": "157679999",
        "expires_in": 157679999,
        "uid": WEIBO_UID.to_string()
    })
}

pub fn weibo_token_info() -> Value {
    json!({
        "uid": WEIBO_UID,
        "appkey": "1234567890",
        "scope": "follow_app_official_microblog",
        "create_at": 1352267591,
        "expire_in": 157679471
    })
}

pub fn weibo_user() -> Value {
    json!({
        "id": WEIBO_UID,
        "idstr": WEIBO_UID.to_string(),
        "screen_name": "zaku",
        "name": "zaku",
        "location": "北京 朝阳区",
        "followers_count": 1204
    })
}

/// Script a successful Weibo flow: token, `get_token_info`, `users/show`.
pub fn script_weibo_flow(transport: &MockTransport) {
    transport
        .push_json(weibo_token())
        .push_json(weibo_token_info())
        .push_json(weibo_user());
}

/// A form body as some providers send for errors on a 200.
pub fn form_error_body(code: &str, description: &str) -> (String, &'static str) {
    let body = url::form_urlencoded::Serializer::new(String::new())
        .append_pair("error", code)
        .append_pair("error_description", description)
        .finish();
    (body, FORM)
}
